//! DHCP Option 43 discovery-string generation.

use ztpflow_core::option43::{self, DiscoveryProtocol, DiscoverySpec};

use crate::cli::{GlobalOpts, Option43Args, ProtocolArg};
use crate::error::CliError;

pub fn handle(args: &Option43Args, global: &GlobalOpts) -> Result<(), CliError> {
    let spec = DiscoverySpec {
        controller_address: &args.address,
        port: args.port,
        protocol: match args.protocol {
            ProtocolArg::Http => DiscoveryProtocol::Http,
            ProtocolArg::Https => DiscoveryProtocol::Https,
        },
        ntp_server: args.ntp.as_deref(),
        trusted_cert_url: args.cert_url.as_deref(),
        use_fqdn: args.fqdn,
    };

    let encoded = option43::encode(&spec)?;

    if global.quiet {
        // Just the hex, ready to paste into a DHCP server config.
        println!("{}", encoded.hex);
    } else {
        println!("text: {}", encoded.text);
        println!("hex:  {}", encoded.hex);
    }
    Ok(())
}

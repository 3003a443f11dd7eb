// DHCP Option 43 discovery-string encoding for PnP.
//
// Devices fresh out of the box learn the controller's address from a
// vendor-specific DHCP suboption before they can reach any API. The
// string is a semicolon-delimited sequence of single-letter tags; the
// hex form is what actually goes into the DHCP server configuration.
//
// Vendor documentation is inconsistent about tag letters and orderings
// across releases, so the vocabulary is an explicit, versioned struct
// rather than something inferred from examples. The default vocabulary
// below is the one this crate tests against.

use crate::error::CoreError;

/// Transport the device should use to reach the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryProtocol {
    Http,
    Https,
}

impl DiscoveryProtocol {
    fn transport_code(self) -> u8 {
        match self {
            Self::Http => 4,
            Self::Https => 5,
        }
    }
}

/// Tag vocabulary for one Option 43 format revision.
///
/// `marker` is the fixed vendor/type prefix; the remaining fields are
/// the single-letter tags in emission order. Swap the whole struct to
/// target a different controller release.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub marker: &'static str,
    pub family_tag: char,
    pub version_tag: char,
    pub count_tag: char,
    pub transport_tag: char,
    pub address_tag: char,
    pub port_tag: char,
    pub ntp_tag: char,
    pub cert_url_tag: char,
    pub option_version: u8,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            marker: "5A1N",
            family_tag: 'B',
            version_tag: 'V',
            count_tag: 'F',
            transport_tag: 'K',
            address_tag: 'I',
            port_tag: 'J',
            ntp_tag: 'Z',
            cert_url_tag: 'T',
            option_version: 1,
        }
    }
}

/// Parameters for one discovery string.
#[derive(Debug, Clone)]
pub struct DiscoverySpec<'a> {
    pub controller_address: &'a str,
    pub port: u16,
    pub protocol: DiscoveryProtocol,
    /// NTP server, required by devices before certificate validation.
    pub ntp_server: Option<&'a str>,
    /// URL of a trusted-certificate bundle for HTTPS discovery.
    pub trusted_cert_url: Option<&'a str>,
    /// Whether `controller_address` is an FQDN rather than an IP literal.
    pub use_fqdn: bool,
}

/// Encoded discovery string in both human-readable and DHCP-ready form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Option43 {
    pub text: String,
    pub hex: String,
}

/// Build the discovery string with the default vocabulary.
pub fn encode(spec: &DiscoverySpec<'_>) -> Result<Option43, CoreError> {
    encode_with(&Vocabulary::default(), spec)
}

/// Build the discovery string with an explicit tag vocabulary.
///
/// The field-count tag's value always equals the number of tags emitted
/// after it; it is recomputed from the optional fields actually present,
/// never hard-coded.
pub fn encode_with(vocab: &Vocabulary, spec: &DiscoverySpec<'_>) -> Result<Option43, CoreError> {
    if spec.controller_address.is_empty() {
        return Err(CoreError::Validation {
            message: "controller address must not be empty".into(),
        });
    }
    if spec.port == 0 {
        return Err(CoreError::Validation {
            message: "port must be in 1..=65535".into(),
        });
    }

    let family = if spec.use_fqdn { 1 } else { 2 };

    // Tags after the count tag: transport, address, port, then optionals.
    let mut fields: Vec<String> = vec![
        format!("{}{}", vocab.transport_tag, spec.protocol.transport_code()),
        format!("{}{}", vocab.address_tag, spec.controller_address),
        format!("{}{}", vocab.port_tag, spec.port),
    ];
    if let Some(ntp) = spec.ntp_server {
        fields.push(format!("{}{}", vocab.ntp_tag, ntp));
    }
    if let Some(url) = spec.trusted_cert_url {
        fields.push(format!("{}{}", vocab.cert_url_tag, url));
    }

    let mut parts: Vec<String> = vec![
        vocab.marker.to_owned(),
        format!("{}{}", vocab.family_tag, family),
        format!("{}{}", vocab.version_tag, vocab.option_version),
        format!("{}{}", vocab.count_tag, fields.len()),
    ];
    parts.extend(fields);

    let text = parts.join(";");
    let hex = to_hex(&text);
    Ok(Option43 { text, hex })
}

/// Lowercase ASCII hex, no separators.
fn to_hex(text: &str) -> String {
    text.bytes().fold(
        String::with_capacity(text.len() * 2),
        |mut out, byte| {
            use std::fmt::Write;
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_spec() -> DiscoverySpec<'static> {
        DiscoverySpec {
            controller_address: "172.19.45.222",
            port: 80,
            protocol: DiscoveryProtocol::Http,
            ntp_server: None,
            trusted_cert_url: None,
            use_fqdn: false,
        }
    }

    #[test]
    fn minimal_ipv4_http() {
        let opt = encode(&base_spec()).unwrap();
        assert_eq!(opt.text, "5A1N;B2;V1;F3;K4;I172.19.45.222;J80");
    }

    #[test]
    fn fqdn_flips_the_family_tag() {
        let spec = DiscoverySpec {
            controller_address: "pnp.example.com",
            use_fqdn: true,
            ..base_spec()
        };
        let opt = encode(&spec).unwrap();
        assert_eq!(opt.text, "5A1N;B1;V1;F3;K4;Ipnp.example.com;J80");
    }

    #[test]
    fn https_with_all_optionals() {
        let spec = DiscoverySpec {
            port: 443,
            protocol: DiscoveryProtocol::Https,
            ntp_server: Some("10.0.0.1"),
            trusted_cert_url: Some("http://10.0.0.2/ca.p7b"),
            ..base_spec()
        };
        let opt = encode(&spec).unwrap();
        assert_eq!(
            opt.text,
            "5A1N;B2;V1;F5;K5;I172.19.45.222;J443;Z10.0.0.1;Thttp://10.0.0.2/ca.p7b"
        );
    }

    #[test]
    fn field_count_matches_emitted_tags_for_all_combinations() {
        let optionals = [
            (None, None),
            (Some("10.0.0.1"), None),
            (None, Some("http://c/ca.p7b")),
            (Some("10.0.0.1"), Some("http://c/ca.p7b")),
        ];
        for protocol in [DiscoveryProtocol::Http, DiscoveryProtocol::Https] {
            for (ntp, cert) in optionals {
                let spec = DiscoverySpec {
                    protocol,
                    ntp_server: ntp,
                    trusted_cert_url: cert,
                    ..base_spec()
                };
                let opt = encode(&spec).unwrap();
                let parts: Vec<&str> = opt.text.split(';').collect();
                let count_tag = parts[3];
                assert!(count_tag.starts_with('F'));
                let declared: usize = count_tag[1..].parse().unwrap();
                assert_eq!(declared, parts.len() - 4, "in {}", opt.text);
            }
        }
    }

    #[test]
    fn hex_round_trips_to_text() {
        let opt = encode(&base_spec()).unwrap();
        assert_eq!(opt.hex.len(), opt.text.len() * 2);
        let decoded: Vec<u8> = opt
            .hex
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap()
            })
            .collect();
        assert_eq!(decoded, opt.text.as_bytes());
        assert!(opt.hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_address_is_rejected() {
        let spec = DiscoverySpec {
            controller_address: "",
            ..base_spec()
        };
        assert!(matches!(
            encode(&spec),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn port_zero_is_rejected() {
        let spec = DiscoverySpec {
            port: 0,
            ..base_spec()
        };
        assert!(matches!(
            encode(&spec),
            Err(CoreError::Validation { .. })
        ));
    }
}

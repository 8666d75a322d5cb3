use std::fmt;
use std::str::FromStr;

use crate::sip_messages::{RegisterType, SipRequest};
use crate::validation::{is_sip_address, split_sip_address, validate_server, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationApproach {
    /// Plain secret sent to the plugin.
    Secret,
    /// md5(`user:domain:secret`) computed locally.
    Ha1Secret,
    /// No secret at all.
    Guest,
}

impl RegistrationApproach {
    pub const ALL: [RegistrationApproach; 3] = [
        RegistrationApproach::Secret,
        RegistrationApproach::Ha1Secret,
        RegistrationApproach::Guest,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            RegistrationApproach::Secret => "secret",
            RegistrationApproach::Ha1Secret => "ha1secret",
            RegistrationApproach::Guest => "guest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegistrationApproach::Secret => "Register using plain secret",
            RegistrationApproach::Ha1Secret => "Register using HA1 secret",
            RegistrationApproach::Guest => "Register as a guest (no secret)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RegistrationApproach::Secret => "Using this approach you'll provide a plain secret to REGISTER",
            RegistrationApproach::Ha1Secret => {
                "Using this approach might not work with Asterisk because the generated HA1 secret could have the wrong realm"
            }
            RegistrationApproach::Guest => {
                "Using this approach you'll try to REGISTER as a guest, that is without providing any secret"
            }
        }
    }

    pub fn uses_secret(&self) -> bool {
        !matches!(self, RegistrationApproach::Guest)
    }
}

impl fmt::Display for RegistrationApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RegistrationApproach {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegistrationApproach::ALL
            .into_iter()
            .find(|approach| approach.id() == s)
            .ok_or_else(|| format!("unknown registration approach '{}'", s))
    }
}

/// Hex md5 of `user:domain:secret`.
pub fn ha1_secret(user: &str, domain: &str, secret: &str) -> String {
    format!("{:x}", md5::compute(format!("{}:{}:{}", user, domain, secret)))
}

/// Raw values of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub server: String,
    pub username: String,
    pub display_name: String,
    pub secret: String,
}

/// What to do with a validated registration.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationPlan {
    Send(SipRequest),
    /// No proxy given: the user must agree to an RFC 3263 lookup first.
    ConfirmProxyLookup(SipRequest),
}

impl RegistrationPlan {
    pub fn request(&self) -> &SipRequest {
        match self {
            RegistrationPlan::Send(request) | RegistrationPlan::ConfirmProxyLookup(request) => request,
        }
    }
}

impl RegistrationForm {
    /// Validates the form and builds the `register` request.
    pub fn plan(&self, approach: Option<RegistrationApproach>) -> Result<RegistrationPlan, ValidationError> {
        let approach = approach.ok_or(ValidationError::MissingApproach)?;
        let proxy = validate_server(&self.server)?;
        let username = self.username.trim();

        let display_name = Some(self.display_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let request = match approach {
            RegistrationApproach::Guest => {
                if !is_sip_address(username) {
                    return Err(ValidationError::InvalidGuestIdentity);
                }
                SipRequest::Register {
                    kind: Some(RegisterType::Guest),
                    username: username.to_string(),
                    display_name,
                    secret: None,
                    ha1_secret: None,
                    proxy: proxy.clone(),
                }
            }
            RegistrationApproach::Secret | RegistrationApproach::Ha1Secret => {
                let (user, domain) = split_sip_address(username)
                    .filter(|_| is_sip_address(username))
                    .ok_or(ValidationError::InvalidIdentity)?;
                if self.secret.is_empty() {
                    return Err(ValidationError::MissingSecret);
                }

                let (secret, ha1) = if approach == RegistrationApproach::Secret {
                    (Some(self.secret.clone()), None)
                } else {
                    (None, Some(ha1_secret(user, domain, &self.secret)))
                };

                SipRequest::Register {
                    kind: None,
                    username: username.to_string(),
                    display_name,
                    secret,
                    ha1_secret: ha1,
                    proxy: proxy.clone(),
                }
            }
        };

        Ok(match proxy {
            Some(_) => RegistrationPlan::Send(request),
            None => RegistrationPlan::ConfirmProxyLookup(request),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(server: &str, username: &str, secret: &str) -> RegistrationForm {
        RegistrationForm {
            server: server.into(),
            username: username.into(),
            display_name: String::new(),
            secret: secret.into(),
        }
    }

    #[test]
    fn test_ha1_matches_md5_of_triplet() {
        let plan = form("sip:10.0.0.1", "sip:alice@example.com", "pw")
            .plan(Some(RegistrationApproach::Ha1Secret))
            .unwrap();

        let expected = format!("{:x}", md5::compute("alice:example.com:pw"));
        match plan.request() {
            SipRequest::Register { ha1_secret, secret, .. } => {
                assert_eq!(ha1_secret.as_deref(), Some(expected.as_str()));
                assert!(secret.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_guest_never_carries_secret() {
        let plan = form("sip:10.0.0.1", "sip:goofy@example.com", "ignored")
            .plan(Some(RegistrationApproach::Guest))
            .unwrap();
        let body = plan.request().to_body().unwrap();
        assert_eq!(body["type"], "guest");
        assert!(body.get("secret").is_none());
        assert!(body.get("ha1_secret").is_none());
    }

    #[test]
    fn test_guest_rejects_empty_identity() {
        assert_eq!(
            form("", "", "").plan(Some(RegistrationApproach::Guest)),
            Err(ValidationError::InvalidGuestIdentity)
        );
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(form("", "", "").plan(None), Err(ValidationError::MissingApproach));
        assert_eq!(
            form("udp:1.2.3.4", "sip:a@b", "x").plan(Some(RegistrationApproach::Secret)),
            Err(ValidationError::InvalidServer)
        );
        assert_eq!(
            form("", "alice", "x").plan(Some(RegistrationApproach::Secret)),
            Err(ValidationError::InvalidIdentity)
        );
        assert_eq!(
            form("", "sip:alice@example.com", "").plan(Some(RegistrationApproach::Secret)),
            Err(ValidationError::MissingSecret)
        );
    }

    #[test]
    fn test_empty_server_needs_confirmation() {
        let plan = form("", "sip:alice@example.com", "pw")
            .plan(Some(RegistrationApproach::Secret))
            .unwrap();
        assert!(matches!(plan, RegistrationPlan::ConfirmProxyLookup(_)));
        assert!(plan.request().to_body().unwrap().get("proxy").is_none());
    }

    #[test]
    fn test_display_name_only_when_given() {
        let mut f = form("sip:proxy", "sip:alice@example.com", "pw");
        f.display_name = "Alice".into();
        let body = f.plan(Some(RegistrationApproach::Secret)).unwrap().request().to_body().unwrap();
        assert_eq!(body["display_name"], "Alice");
        assert_eq!(body["secret"], "pw");
        assert_eq!(body["proxy"], "sip:proxy");
    }

    #[test]
    fn test_approach_ids_round_trip() {
        for approach in RegistrationApproach::ALL {
            assert_eq!(approach.id().parse::<RegistrationApproach>(), Ok(approach));
        }
        assert!(!RegistrationApproach::Guest.uses_secret());
    }
}

use std::fmt;

/// Connection details for a BOSH Director.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    /// Director URL (may be a bare address; the client normalises it).
    pub environment: String,
    /// UAA client name.
    pub client: String,
    /// UAA client secret.
    pub client_secret: String,
    /// CA certificate, either PEM content or a path to a PEM file.
    pub ca_cert: Option<String>,
}

impl Credentials {
    pub fn new(
        environment: impl Into<String>,
        client: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            client: client.into(),
            client_secret: client_secret.into(),
            ca_cert: None,
        }
    }

    pub fn with_ca_cert(mut self, ca_cert: impl Into<String>) -> Self {
        let ca_cert = ca_cert.into();
        self.ca_cert = (!ca_cert.is_empty()).then_some(ca_cert);
        self
    }

    /// True when the endpoint, client and secret are all present.
    pub fn is_valid(&self) -> bool {
        !self.environment.is_empty() && !self.client.is_empty() && !self.client_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("environment", &self.environment)
            .field("client", &self.client)
            .field("client_secret", &"<redacted>")
            .field("ca_cert", &self.ca_cert.as_ref().map(|_| "<set>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_requires_three_fields() {
        assert!(Credentials::new("https://10.0.0.5:25555", "admin", "secret").is_valid());
        assert!(!Credentials::new("", "admin", "secret").is_valid());
        assert!(!Credentials::new("https://10.0.0.5:25555", "", "secret").is_valid());
        assert!(!Credentials::new("https://10.0.0.5:25555", "admin", "").is_valid());
    }

    #[test]
    fn empty_ca_cert_is_none() {
        let creds = Credentials::new("e", "c", "s").with_ca_cert("");
        assert_eq!(creds.ca_cert, None);
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("e", "c", "hunter2");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}

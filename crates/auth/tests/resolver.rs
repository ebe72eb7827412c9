//! Resolution across the full source chain.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use auth::{
    BOSH_CLIENT, BOSH_CLIENT_SECRET, BOSH_ENVIRONMENT, ConfigFileSource, EnvSource, OM_TARGET,
    OmSource, Resolver, Vars,
};
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
environments:
  sandbox:
    url: https://sandbox.example.com:25555
    client: sandbox-admin
    client_secret: sandbox-secret
    ca_cert: |
      -----BEGIN CERTIFICATE-----
      MIIB
      -----END CERTIFICATE-----
"#;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn no_vars() -> Vars {
    Vars::from_pairs(Vec::<(String, String)>::new())
}

fn resolver(env: Vars, config: &NamedTempFile, om: OmSource) -> Resolver {
    Resolver::new(vec![
        Box::new(EnvSource::with_vars(env)),
        Box::new(ConfigFileSource::new(config.path())),
        Box::new(om),
    ])
}

fn om_disabled() -> OmSource {
    OmSource::new().with_vars(no_vars())
}

#[tokio::test]
async fn env_takes_precedence_over_config() {
    let config = config_file(CONFIG);
    let env = Vars::from_pairs([
        (BOSH_ENVIRONMENT, "https://env.example.com:25555"),
        (BOSH_CLIENT, "env-client"),
        (BOSH_CLIENT_SECRET, "env-secret"),
    ]);

    let creds = resolver(env, &config, om_disabled())
        .resolve(Some("sandbox"))
        .await
        .unwrap();
    assert_eq!(creds.environment, "https://env.example.com:25555");
    assert_eq!(creds.client, "env-client");
}

#[tokio::test]
async fn falls_back_to_single_config_entry() {
    let config = config_file(CONFIG);
    let creds = resolver(no_vars(), &config, om_disabled())
        .resolve(None)
        .await
        .unwrap();
    assert_eq!(creds.client, "sandbox-admin");
}

#[tokio::test]
async fn named_entry_fields_returned_exactly() {
    let config = config_file(CONFIG);
    let creds = resolver(no_vars(), &config, om_disabled())
        .resolve(Some("sandbox"))
        .await
        .unwrap();
    assert_eq!(creds.environment, "https://sandbox.example.com:25555");
    assert_eq!(creds.client, "sandbox-admin");
    assert_eq!(creds.client_secret, "sandbox-secret");
    assert!(
        creds
            .ca_cert
            .as_deref()
            .unwrap()
            .starts_with("-----BEGIN CERTIFICATE-----")
    );
}

#[tokio::test]
async fn malformed_config_propagates() {
    let config = config_file("environments: [");
    let err = resolver(no_vars(), &config, om_disabled())
        .resolve(None)
        .await
        .unwrap_err();
    assert!(matches!(err, auth::Error::Parse { .. }));
}

#[tokio::test]
async fn nothing_available() {
    let config = config_file("environments: {}\n");
    let err = resolver(no_vars(), &config, om_disabled())
        .resolve(None)
        .await
        .unwrap_err();
    assert!(matches!(err, auth::Error::NoCredentials));
}

#[cfg(unix)]
mod om {
    use super::*;

    /// A fake `om bosh-env` that appends a line to `counter` on every run.
    fn fake_om(counter: &std::path::Path) -> OmSource {
        let script = format!(
            "echo run >> '{}'; sleep 0.1; \
             echo 'export BOSH_ENVIRONMENT=10.0.0.5'; \
             echo 'export BOSH_CLIENT=ops_manager'; \
             echo 'export BOSH_CLIENT_SECRET=om-secret'",
            counter.display()
        );
        OmSource::new()
            .with_vars(Vars::from_pairs([(OM_TARGET, "opsman.example.com")]))
            .with_command("sh", ["-c".to_string(), script])
    }

    fn runs(counter: &std::path::Path) -> usize {
        std::fs::read_to_string(counter)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn used_when_earlier_sources_empty() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("count");
        let config = config_file("environments: {}\n");

        let creds = resolver(no_vars(), &config, fake_om(&counter))
            .resolve(None)
            .await
            .unwrap();
        assert_eq!(creds.environment, "10.0.0.5");
        assert_eq!(creds.client, "ops_manager");
    }

    #[tokio::test]
    async fn concurrent_resolutions_share_one_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("count");
        let config = config_file("environments: {}\n");
        let resolver = Arc::new(resolver(no_vars(), &config, fake_om(&counter)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve(None).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().client, "ops_manager");
        }

        assert_eq!(runs(&counter), 1);
    }

    #[tokio::test]
    async fn refetches_after_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("count");
        let source = fake_om(&counter).with_cache_ttl(Duration::from_millis(50));
        let config = config_file("environments: {}\n");
        let resolver = resolver(no_vars(), &config, source);

        resolver.resolve(None).await.unwrap();
        resolver.resolve(None).await.unwrap();
        assert_eq!(runs(&counter), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        resolver.resolve(None).await.unwrap();
        assert_eq!(runs(&counter), 2);
    }

    #[tokio::test]
    async fn nonzero_exit_is_error() {
        let source = OmSource::new()
            .with_vars(Vars::from_pairs([(OM_TARGET, "opsman.example.com")]))
            .with_command("sh", ["-c", "echo boom >&2; exit 3"]);
        let config = config_file("environments: {}\n");

        let err = resolver(no_vars(), &config, source)
            .resolve(None)
            .await
            .unwrap_err();
        match err {
            auth::Error::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

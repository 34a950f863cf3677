//! Authorize command: one-time Google consent for Drive uploads.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};

use roster_api::{GoogleAuth, InstalledClientSecret, parse_authorization_code};

use crate::Config;

/// Prints the consent URL, reads the code (or redirect URL) from `reader`
/// and stores the resulting token.
pub fn run<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, config: &Config) -> Result<()> {
    let secret_path = &config.google.client_secret_path;
    let secret = InstalledClientSecret::load(secret_path)
        .with_context(|| format!("failed to load {}", secret_path.display()))?;

    writeln!(writer, "Open this URL in a browser and approve access:")?;
    writeln!(writer)?;
    writeln!(writer, "  {}", secret.authorization_url()?)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Then paste the code, or the full URL the browser was redirected to:"
    )?;
    writer.flush()?;

    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed to read authorization code")?;
    let Some(code) = parse_authorization_code(&line) else {
        bail!("no authorization code provided");
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let user = runtime
        .block_on(async { GoogleAuth::new()?.exchange_code(&secret, &code).await })
        .context("failed to exchange authorization code")?;

    let token_path = &config.google.token_path;
    user.save(token_path)
        .with_context(|| format!("failed to save {}", token_path.display()))?;
    writeln!(writer, "Saved token to {}", token_path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.google.client_secret_path = dir.join("client_secret.json");
        config.google.token_path = dir.join("token.json");
        config
    }

    #[test]
    fn authorize_requires_client_secret() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());

        let err = run(&mut Cursor::new(""), &mut Vec::new(), &config).unwrap_err();
        assert!(err.to_string().contains("client_secret.json"));
    }

    #[test]
    fn authorize_rejects_empty_code() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        fs::write(
            &config.google.client_secret_path,
            r#"{"installed": {"client_id": "cid", "client_secret": "cs"}}"#,
        )
        .unwrap();

        let mut output = Vec::new();
        let err = run(&mut Cursor::new("\n"), &mut output, &config).unwrap_err();

        assert!(err.to_string().contains("no authorization code"));
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("client_id=cid"));
        assert!(!config.google.token_path.exists());
    }
}

//! Session bootstrap and interactive user login.
//!
//! The session lives in `<session_dir>/<phone>/session.bin` so several
//! accounts can share one working directory. Login only runs when that
//! session is missing or no longer authorized.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use layer_client::{BinaryFileBackend, Client, Config, ShutdownToken, SignInError};

use crate::errors::Result;

/// Everything needed to open a user-account connection.
#[derive(Clone)]
pub struct Credentials {
    pub api_id:      i32,
    pub api_hash:    String,
    pub phone:       String,
    /// Parent of the per-phone session directories.
    pub session_dir: PathBuf,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("phone", &self.phone)
            .field("session_dir", &self.session_dir)
            .finish()
    }
}

/// Directory holding the session of `phone` under `base`.
///
/// Anything other than digits and `+` is dropped from the phone number.
pub fn session_dir_for(base: &Path, phone: &str) -> PathBuf {
    let name: String = phone.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
    base.join(if name.is_empty() { "default".to_string() } else { name })
}

/// Create the per-phone session directory (mode 0700 on Unix) and return
/// the session file path inside it.
pub fn prepare_session_file(base: &Path, phone: &str) -> io::Result<PathBuf> {
    let dir = session_dir_for(base, phone);
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(&dir)?;
    Ok(dir.join("session.bin"))
}

/// Connect, reusing the stored session if there is one.
///
/// Cancelling the returned token closes the connection.
pub async fn connect(creds: &Credentials) -> Result<(Client, ShutdownToken)> {
    let session_file = prepare_session_file(&creds.session_dir, &creds.phone)?;
    log::info!("storing session in {}", session_file.display());

    let (client, shutdown) = Client::connect(Config {
        api_id:          creds.api_id,
        api_hash:        creds.api_hash.clone(),
        session_backend: Arc::new(BinaryFileBackend::new(session_file)),
        ..Default::default()
    }).await?;
    Ok((client, shutdown))
}

// ─── Prompt ───────────────────────────────────────────────────────────────────

/// Source of the one-time login code and the optional 2FA password.
pub trait Prompt {
    fn login_code(&mut self) -> io::Result<String>;
    fn password(&mut self, hint: &str) -> io::Result<String>;
}

/// Reads answers from standard input.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    fn ask(msg: &str) -> io::Result<String> {
        print!("{msg}");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(line.trim().to_string())
    }
}

impl Prompt for StdinPrompt {
    fn login_code(&mut self) -> io::Result<String> {
        Self::ask("Enter code: ")
    }

    fn password(&mut self, hint: &str) -> io::Result<String> {
        Self::ask(&format!("2FA password (hint: {hint}): "))
    }
}

// ─── Login ────────────────────────────────────────────────────────────────────

/// Log in with phone + code (and password when 2FA is on) unless the
/// session is already authorized. Returns `true` if a login took place.
pub async fn ensure_authorized<P: Prompt + ?Sized>(
    client: &Client,
    phone:  &str,
    prompt: &mut P,
) -> Result<bool> {
    if client.is_authorized().await? {
        log::info!("already logged in");
        return Ok(false);
    }

    log::info!("sending login code to {phone}");
    let token = client.request_login_code(phone).await?;
    let code  = prompt.login_code()?;

    match client.sign_in(&token, &code).await {
        Ok(name) => log::info!("signed in as {name}"),
        Err(SignInError::PasswordRequired(pw_token)) => {
            let hint = pw_token.hint().unwrap_or("no hint").to_string();
            let pw   = prompt.password(&hint)?;
            client.check_password(*pw_token, pw.trim()).await?;
            log::info!("2FA complete");
        }
        Err(e) => return Err(e.into()),
    }

    client.save_session().await?;
    log::info!("session saved");
    Ok(true)
}

use std::io::{BufRead, Write};

use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Connection parameters for one `PostgreSQL` server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Role to authenticate as.
    pub user: String,
    /// Password for the role.
    pub password: String,
    /// Database to open. May be empty, in which case the server applies its
    /// own default.
    pub dbname: String,
}

impl Credentials {
    /// Build the libpq keyword/value connection string.
    ///
    /// Connection establishment is bounded by `connect_timeout`; the scan
    /// queries themselves run without one.
    pub fn connection_string(&self, sslmode: &str) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={} connect_timeout=5",
            quote_value(&self.host),
            self.port,
            quote_value(&self.user),
            quote_value(&self.password),
            quote_value(&self.dbname),
            quote_value(sslmode),
        )
    }
}

/// Quote a libpq keyword/value entry. Values with whitespace, quotes, or
/// backslashes must be single-quoted, with `'` and `\` backslash-escaped.
fn quote_value(value: &str) -> String {
    let needs_quoting = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quoting {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Source of connection credentials, so the scan never has to know whether
/// they came from a settings file, a terminal, or a test double.
pub trait CredentialsProvider {
    /// Produce a full set of credentials, or fail after bounded attempts.
    fn provide(&mut self) -> Result<Credentials, String>;
}

/// Interactive [`CredentialsProvider`] asking for one parameter at a time.
///
/// Generic over its reader and writer; production wires it to stdin and
/// stderr.
pub struct TermPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TermPrompt<R, W> {
    /// Create a prompt reading answers from `input` and writing questions to
    /// `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for one parameter, re-asking on blank answers up to three times.
    fn read_param(&mut self, msg: &str) -> Result<String, String> {
        let mut tries = 0;

        loop {
            tries += 1;
            if tries > 3 {
                return Err(format!("no answer for {msg:?} after 3 attempts"));
            }

            write!(self.output, "{msg}").map_err(|e| format!("failed to write prompt: {e}"))?;
            self.output
                .flush()
                .map_err(|e| format!("failed to write prompt: {e}"))?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| format!("failed to read answer: {e}"))?;
            if read == 0 {
                return Err("input closed before an answer was given".to_string());
            }

            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }
}

impl<R: BufRead, W: Write> CredentialsProvider for TermPrompt<R, W> {
    fn provide(&mut self) -> Result<Credentials, String> {
        let host = self.read_param("please specify host: ")?;
        let port_answer = self.read_param("please specify port: ")?;
        let port = port_answer
            .parse::<u16>()
            .map_err(|e| format!("invalid port {port_answer:?}: {e}"))?;
        let user = self.read_param("please specify user: ")?;
        let password = self.read_param("please specify password: ")?;
        let dbname = self.read_param("please specify db name: ")?;

        Ok(Credentials {
            host,
            port,
            user,
            password,
            dbname,
        })
    }
}

/// Open a connection and verify it with a `select 1` round-trip before any
/// scanning starts.
pub fn establish(credentials: &Credentials, sslmode: &str) -> Result<PgConnection, String> {
    let mut conn = PgConnection::establish(&credentials.connection_string(sslmode)).map_err(
        |e| {
            format!(
                "failed to connect to {}:{}: {e}",
                credentials.host, credentials.port
            )
        },
    )?;

    diesel::sql_query("select 1")
        .execute(&mut conn)
        .map_err(|e| format!("connection check failed: {e}"))?;

    Ok(conn)
}

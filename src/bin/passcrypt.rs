//! passcrypt CLI - passphrase-based text and file encryption
//!
//! Command-line front end for the passcrypt library: PBKDF2 key derivation
//! and AES-256-GCM authenticated encryption.

use std::error::Error as StdError;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use passcrypt::error::{CryptError, ErrorCategory, ErrorKind, Result};
use passcrypt::file_ops::{self, Direction};
use passcrypt::kdf::{DEFAULT_ITERATIONS, KdfParams, Prf};
use passcrypt::passphrase::{
    self, PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader,
};
use passcrypt::service::Crypter;

#[derive(Parser)]
#[command(name = "passcrypt")]
#[command(version)]
#[command(about = "Passphrase-based text and file encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Key derivation salt; must match the one used to encrypt
    #[arg(long, global = true, env = "PASSCRYPT_SALT", default_value = "RandomSalt")]
    salt: String,

    /// PBKDF2 iteration count; must match the one used to encrypt
    #[arg(long, global = true, env = "PASSCRYPT_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,

    /// PBKDF2 pseudorandom function; must match the one used to encrypt
    #[arg(long, global = true, env = "PASSCRYPT_PRF", value_enum, default_value_t = PrfArg::Sha1)]
    prf: PrfArg,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PrfArg {
    Sha1,
    Sha256,
}

impl From<PrfArg> for Prf {
    fn from(arg: PrfArg) -> Self {
        match arg {
            PrfArg::Sha1 => Prf::HmacSha1,
            PrfArg::Sha256 => Prf::HmacSha256,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the encrypted blob to [default: INPUT.enc]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the plaintext to [default: INPUT without .enc]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Update an encrypted file with new content, while validating
    /// that the passphrase is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing encrypted file to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Encrypt text and print it as base64
    #[command(alias = "et")]
    EncryptText {
        /// Text to encrypt; read from stdin when omitted
        text: Option<String>,
    },

    /// Decrypt base64 text produced by encrypt-text
    #[command(alias = "dt")]
    DecryptText {
        /// Encrypted text; read from stdin when omitted
        text: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", render_chain(&e));
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let params = KdfParams::new(cli.salt.into_bytes(), cli.iterations, cli.prf.into())?;
    debug!(
        iterations = params.iterations(),
        prf = params.prf().name(),
        "using key derivation parameters"
    );
    let crypter = Crypter::new(params);
    let mut reader = passphrase_reader(cli.passphrase_stdin);

    match cli.command {
        Commands::Encrypt { input, output } => {
            let output = resolve_output(&input, output, Direction::Encrypt)?;
            file_ops::encrypt_file(&crypter, &input, &output, &mut *reader)
        }
        Commands::Decrypt { input, output } => {
            let output = resolve_output(&input, output, Direction::Decrypt)?;
            file_ops::decrypt_file(&crypter, &input, &output, &mut *reader)
        }
        Commands::Update { input, output } => {
            file_ops::update_file(&crypter, &input, &output, &mut *reader)
        }
        Commands::EncryptText { text } => {
            let text = text_input(text, cli.passphrase_stdin)?;
            let passphrase = reader.read_passphrase()?;
            let armored = crypter.encrypt_text(text.trim(), passphrase::as_utf8(&passphrase)?)?;
            print_line(&armored)
        }
        Commands::DecryptText { text } => {
            let text = text_input(text, cli.passphrase_stdin)?;
            let passphrase = reader.read_passphrase()?;
            let plaintext = Zeroizing::new(
                crypter
                    .decrypt_text(text.trim(), passphrase::as_utf8(&passphrase)?)
                    .map_err(|e| e.with_context("failed to decrypt"))?,
            );
            print_line(&plaintext)
        }
    }
}

fn passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader::default())
    }
}

fn resolve_output(input: &Path, output: Option<PathBuf>, direction: Direction) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(path),
        None => file_ops::default_output_path(input, direction),
    }
}

/// Text given on the command line, or all of stdin.
fn text_input(text: Option<String>, passphrase_stdin: bool) -> Result<Zeroizing<String>> {
    if let Some(text) = text {
        return Ok(Zeroizing::new(text));
    }
    if passphrase_stdin {
        return Err(CryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::PassphraseUnavailable,
            "cannot read both text and passphrase from stdin; pass the text as an argument",
        ));
    }

    let mut text = Zeroizing::new(String::new());
    io::stdin().read_to_string(&mut text).map_err(|e| {
        CryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            "failed to read text from stdin",
            e,
        )
    })?;
    Ok(text)
}

fn print_line(line: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", line)
        .and_then(|()| stdout.flush())
        .map_err(|e| {
            CryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to write to stdout",
                e,
            )
        })
}

/// `outer: inner: innermost`, following source errors.
fn render_chain(err: &CryptError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

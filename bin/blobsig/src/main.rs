use std::path::{Path, PathBuf};

use blobsig_tx::{
    load_config, BlobTxGateway, DirectCodec, MalleationVerifier, MsgWirePayForBlob, Namespace,
    PrivKey, SignerData, TxBuilder,
};
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "blobsig")]
#[command(about = "Sign and verify pay-for-blob transactions")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a hex-encoded transaction for the signer described in a JSON file
    Verify {
        /// Config YAML path
        #[arg(long, default_value = "blobsig.yaml")]
        config: PathBuf,

        /// Signer JSON: chain_id, account_number, sequence, pub_key
        #[arg(long)]
        signer: PathBuf,

        /// Hex-encoded transaction, or @path to a file containing it
        #[arg(long)]
        tx: String,
    },

    /// Generate an ed25519 key and print it with its signer data
    Keygen {
        #[arg(long, default_value = "blobsig-1")]
        chain_id: String,

        #[arg(long, default_value_t = 0)]
        account_number: u64,
    },

    /// Wrap a blob into a signed transaction and print it hex-encoded
    Sign {
        /// Config YAML path
        #[arg(long, default_value = "blobsig.yaml")]
        config: PathBuf,

        /// Hex-encoded ed25519 private key
        #[arg(long)]
        key: String,

        /// Hex-encoded 8-byte namespace
        #[arg(long)]
        namespace: String,

        /// File holding the raw blob
        #[arg(long)]
        blob: PathBuf,

        /// Candidate square sizes
        #[arg(long, value_delimiter = ',', default_value = "2,4,8,16,32,64,128")]
        square_sizes: Vec<u64>,

        #[arg(long, default_value_t = 0)]
        account_number: u64,

        #[arg(long, default_value_t = 0)]
        sequence: u64,

        #[arg(long, default_value_t = 200_000)]
        gas_limit: u64,
    },
}

#[derive(Serialize)]
struct KeygenOutput {
    private_key: String,
    address: String,
    signer: SignerData,
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let result = match args.command {
        Command::Verify { config, signer, tx } => run_verify(&config, &signer, &tx),
        Command::Keygen {
            chain_id,
            account_number,
        } => run_keygen(chain_id, account_number),
        Command::Sign {
            config,
            key,
            namespace,
            blob,
            square_sizes,
            account_number,
            sequence,
            gas_limit,
        } => run_sign(SignArgs {
            config,
            key,
            namespace,
            blob,
            square_sizes,
            account_number,
            sequence,
            gas_limit,
        }),
    };

    if let Err(err) = result {
        eprintln!("blobsig failed: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).init();
}

fn run_verify(config: &Path, signer: &Path, tx: &str) -> Result<(), String> {
    let config = load_config(config).map_err(|e| e.to_string())?;
    let signer = read_signer(signer)?;
    let raw = decode_hex(&read_arg(tx)?)?;

    let gateway = BlobTxGateway::from_config(&config);
    let admitted = gateway
        .decode_and_admit(&signer, &raw)
        .map_err(|e| e.to_string())?;

    tracing::info!(
        tx_hash = %admitted.tx_hash_hex(),
        square_size = ?admitted.square_size,
        "signature verified"
    );
    println!("{}", admitted.tx_hash_hex());
    Ok(())
}

fn run_keygen(chain_id: String, account_number: u64) -> Result<(), String> {
    let key = ed25519_dalek::SigningKey::generate(&mut OsRng);
    let private_key = hex::encode(key.to_bytes());
    let pub_key = PrivKey::Ed25519(key).pub_key();

    let output = KeygenOutput {
        private_key,
        address: pub_key.address_hex(),
        signer: SignerData {
            chain_id,
            account_number,
            sequence: 0,
            pub_key,
        },
    };
    let json = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

struct SignArgs {
    config: PathBuf,
    key: String,
    namespace: String,
    blob: PathBuf,
    square_sizes: Vec<u64>,
    account_number: u64,
    sequence: u64,
    gas_limit: u64,
}

fn run_sign(args: SignArgs) -> Result<(), String> {
    let config = load_config(&args.config).map_err(|e| e.to_string())?;
    let key = parse_ed25519_key(&args.key)?;
    let namespace = parse_namespace(&args.namespace)?;
    let data = std::fs::read(&args.blob)
        .map_err(|e| format!("failed to read blob '{}': {e}", args.blob.display()))?;

    let pub_key = key.pub_key();
    let signer = SignerData {
        chain_id: config.chain_id.clone(),
        account_number: args.account_number,
        sequence: args.sequence,
        pub_key: pub_key.clone(),
    };

    let msg = MsgWirePayForBlob::new(pub_key.address_hex(), namespace, data, &args.square_sizes)
        .map_err(|e| e.to_string())?;
    let mut template = TxBuilder::new();
    template.set_gas_limit(args.gas_limit);

    let tx = MalleationVerifier::new(config.blob)
        .sign_wire_pfb_tx(&key, &signer, &DirectCodec, &template, msg)
        .map_err(|e| e.to_string())?;
    let raw = tx.to_bytes().map_err(|e| e.to_string())?;

    tracing::debug!(
        bytes = raw.len(),
        candidates = args.square_sizes.len(),
        "signed wrapped transaction"
    );
    println!("{}", hex::encode(raw));
    Ok(())
}

fn read_signer(path: &Path) -> Result<SignerData, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read signer '{}': {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("failed to parse signer '{}': {e}", path.display()))
}

/// `@path` reads the value from a file.
fn read_arg(value: &str) -> Result<String, String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map(|s| s.trim().to_string())
            .map_err(|e| format!("failed to read '{path}': {e}")),
        None => Ok(value.trim().to_string()),
    }
}

fn decode_hex(input: &str) -> Result<Vec<u8>, String> {
    let hex_str = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    hex::decode(hex_str).map_err(|e| format!("invalid hex: {e}"))
}

fn parse_ed25519_key(input: &str) -> Result<PrivKey, String> {
    let bytes: [u8; 32] = decode_hex(input.trim())?
        .try_into()
        .map_err(|bytes: Vec<u8>| format!("ed25519 key must be 32 bytes, got {}", bytes.len()))?;
    Ok(PrivKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&bytes)))
}

fn parse_namespace(input: &str) -> Result<Namespace, String> {
    let bytes: [u8; 8] = decode_hex(input.trim())?
        .try_into()
        .map_err(|bytes: Vec<u8>| format!("namespace must be 8 bytes, got {}", bytes.len()))?;
    Ok(Namespace(bytes))
}

//! # vault-signer CLI
//!
//! Vaultに保管された鍵で証明書チェーンの取得とダイジェスト署名を行う。
//!
//! ## 使い方
//! ```text
//! VAULT_ADDR=https://vault.example.com:8200 VAULT_TOKEN=... \
//!   vault-signer --key-id release-key certificate-chain
//! vault-signer --key-id release-key sign --algorithm pss --digest-hex <sha256>
//! ```
//!
//! 結果は標準出力、ログは標準エラー出力に書き出す。

mod commands;

use clap::{Parser, Subcommand};
use vault_signer_core::{VaultClient, VaultConfig};

#[derive(Parser, Debug)]
#[command(name = "vault-signer", version, about = "Vault鍵による証明書取得・署名ツール")]
struct Cli {
    /// 鍵ID（KVパス兼Transit鍵名）
    #[arg(long)]
    key_id: String,

    /// KV v2マウントパス（未指定時は VAULT_KV_MOUNT または "secret"）
    #[arg(long)]
    kv_mount: Option<String>,

    /// Transitマウントパス（未指定時は VAULT_TRANSIT_MOUNT または "transit"）
    #[arg(long)]
    transit_mount: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 証明書チェーンをPEMで出力する
    CertificateChain,
    /// ハッシュ済みダイジェストに署名し、署名をBase64で出力する
    Sign {
        /// 署名アルゴリズム（例: pss, pkcs1v15）
        #[arg(long)]
        algorithm: String,
        /// Base64エンコードされたダイジェスト
        #[arg(long, conflicts_with = "digest_hex", required_unless_present = "digest_hex")]
        digest: Option<String>,
        /// 16進エンコードされたダイジェスト
        #[arg(long)]
        digest_hex: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = VaultConfig::from_env()?;
    if let Some(mount) = cli.kv_mount {
        config = config.with_kv_mount(mount);
    }
    if let Some(mount) = cli.transit_mount {
        config = config.with_transit_mount(mount);
    }
    tracing::debug!(?config, "Vault設定を読み込みました");

    let vault = VaultClient::new(config, cli.key_id)?;

    let output = match cli.command {
        Command::CertificateChain => commands::certificate_chain(&vault).await?,
        Command::Sign {
            algorithm,
            digest,
            digest_hex,
        } => {
            let encoded = commands::encoded_digest(digest, digest_hex)?;
            commands::sign(&vault, &encoded, &algorithm).await?
        }
    };

    print!("{output}");
    Ok(())
}

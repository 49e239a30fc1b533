use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use ethers::{
    providers::Middleware,
    types::{H160, U256},
    utils::to_checksum,
};

use crate::{
    artifact::{default_artifact, Artifact},
    deploy::{Deploy, Deployment},
    env_file::{self, Outcome, ENV_KEY},
};

/// Deploy the AshNFT contract and record its address for the frontend.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CommandLine {
    #[clap(short, long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc: String,

    #[clap(long, env = "DEPLOYER_PRIVATE_KEY", hide_env_values = true)]
    sk: String,

    /// Hardhat artifact of the contract, `contracts/artifacts/...` of this repository by default
    #[clap(short, long, env = "ASHNFT_ARTIFACT")]
    artifact: Option<PathBuf>,

    /// Initial owner, the deployer when omitted
    #[clap(short, long, env = "ASHNFT_OWNER")]
    owner: Option<H160>,

    #[clap(short, long, env = "ASHNFT_MAX_SUPPLY", default_value = "10000", value_parser = parse_max_supply)]
    max_supply: U256,

    /// Env file to update, `frontend/.env.local` of this repository by default
    #[clap(short, long, env = "FRONTEND_ENV_FILE")]
    env_file: Option<PathBuf>,

    #[clap(short = 'k', long, env = "FRONTEND_ENV_KEY", default_value = ENV_KEY, value_parser = parse_env_key)]
    env_key: String,

    /// Fail when the deployed owner or max supply differ from the arguments
    #[clap(long)]
    strict: bool,
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let artifact_path = self.artifact.clone().unwrap_or_else(default_artifact);
        let artifact = Artifact::load(&artifact_path)?;
        let deploy = Deploy::new(&self.rpc, &self.sk).await?;
        self.run(&deploy, &artifact).await
    }

    async fn run<M: Middleware + 'static>(
        &self,
        deploy: &Deploy<M>,
        artifact: &Artifact,
    ) -> Result<()> {
        let owner = match self.owner {
            Some(owner) => owner,
            None => deploy.signer_address()?,
        };

        let deployment = deploy.run(artifact, owner, self.max_supply).await?;
        self.record(&deployment, owner)
    }

    /// Checks the deployed state and writes its address to the env file.
    /// Env file errors are logged and do not fail the run.
    fn record(&self, deployment: &Deployment, owner: H160) -> Result<()> {
        let mismatches = deployment.mismatches(owner, self.max_supply);
        if self.strict && !mismatches.is_empty() {
            return Err(anyhow!(
                "deployed contract state mismatch: {}",
                mismatches.join(", ")
            ));
        }
        for mismatch in &mismatches {
            log::warn!("deployed contract {}", mismatch);
        }

        let address = to_checksum(&deployment.address, None);
        println!("\n--- contract address (update your .env.local) ---");
        println!("{}={}", self.env_key, address);

        let env_file = self.env_file.clone().unwrap_or_else(default_env_file);
        match env_file::update(&env_file, &self.env_key, &address) {
            Ok(Outcome::Created) => println!("created {}", env_file.display()),
            Ok(Outcome::Updated) => println!("updated {}", env_file.display()),
            Err(err) => log::error!("failed to update {}: {:?}", env_file.display(), err),
        }

        println!("\ndeployment complete");
        Ok(())
    }
}

fn default_env_file() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("frontend")
        .join(".env.local")
}

fn parse_max_supply(value: &str) -> Result<U256, String> {
    U256::from_dec_str(value).map_err(|_| format!("`{value}` is not an unsigned integer"))
}

fn parse_env_key(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("env key must not be empty".to_string());
    }
    if value.contains('=') || value.chars().any(char::is_whitespace) {
        return Err(format!("`{value}` is not a valid env key"));
    }
    Ok(value.to_string())
}

use std::sync::Arc;

use anyhow::{anyhow, Result};
use ethers::{
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{H160, U256},
};

use crate::{
    artifact::Artifact,
    contracts::AshNFT,
    utils::{decode_hex, display_balance},
};

/// State read back from a deployed AshNFT instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: H160,
    pub name: String,
    pub symbol: String,
    pub max_supply: U256,
    pub owner: H160,
}

impl Deployment {
    /// Differences between the queried state and the constructor arguments.
    pub fn mismatches(&self, owner: H160, max_supply: U256) -> Vec<String> {
        let mut mismatches = Vec::new();
        if self.owner != owner {
            mismatches.push(format!("owner is {:?}, expected {:?}", self.owner, owner));
        }
        if self.max_supply != max_supply {
            mismatches.push(format!(
                "max supply is {}, expected {}",
                self.max_supply, max_supply
            ));
        }
        mismatches
    }
}

pub struct Deploy<M> {
    client: Arc<M>,
}

impl Deploy<SignerMiddleware<Provider<Http>, LocalWallet>> {
    pub async fn new(rpc: &str, sk: &str) -> Result<Self> {
        let wallet = LocalWallet::from_bytes(&decode_hex(sk)?)?;
        let provider = Provider::<Http>::try_from(rpc)?;

        let client = Arc::new(SignerMiddleware::new(
            provider.clone(),
            wallet.with_chain_id(provider.get_chainid().await?.as_u64()),
        ));

        Ok(Self::with_client(client))
    }
}

impl<M: Middleware + 'static> Deploy<M> {
    pub fn with_client(client: Arc<M>) -> Self {
        Self { client }
    }

    pub fn signer_address(&self) -> Result<H160> {
        self.client
            .default_sender()
            .ok_or(anyhow!("signer address not found"))
    }

    pub async fn balance(&self, address: H160) -> Result<U256> {
        Ok(self.client.get_balance(address, None).await?)
    }

    /// Sends the creation transaction and waits for its receipt.
    pub async fn deploy(
        &self,
        artifact: &Artifact,
        owner: H160,
        max_supply: U256,
    ) -> Result<H160> {
        let factory = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        );

        let (contract, receipt) = factory
            .deploy((owner, max_supply))?
            .legacy()
            .send_with_receipt()
            .await?;
        log::info!("transaction hash:{:?}", receipt.transaction_hash);

        Ok(contract.address())
    }

    pub async fn query(&self, address: H160) -> Result<Deployment> {
        let contract = AshNFT::new(address, self.client.clone());

        Ok(Deployment {
            address,
            name: contract.name().call().await?,
            symbol: contract.symbol().call().await?,
            max_supply: contract.max_supply().call().await?,
            owner: contract.owner().call().await?,
        })
    }

    pub async fn run(
        &self,
        artifact: &Artifact,
        owner: H160,
        max_supply: U256,
    ) -> Result<Deployment> {
        let signer = self.signer_address()?;
        println!("deployer address:{:?}", signer);
        println!("deployer balance:{}", display_balance(self.balance(signer).await?));

        println!("\ndeploying {} contract...", artifact.contract_name);
        let address = self.deploy(artifact, owner, max_supply).await?;
        println!("{} address:{:?}", artifact.contract_name, address);

        let deployment = self.query(address).await?;
        println!("name:{}", deployment.name);
        println!("symbol:{}", deployment.symbol);
        println!("max supply:{}", deployment.max_supply);
        println!("owner:{:?}", deployment.owner);

        Ok(deployment)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::artifact::tests::ASHNFT_ARTIFACT;
    use ethers::{
        abi::{self, Token},
        providers::{JsonRpcError, MockProvider, MockResponse},
        types::Bytes,
    };

    // First default account of a local Hardhat node.
    pub const DEPLOYER_SK: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    pub fn mocked_deploy() -> (
        Deploy<SignerMiddleware<Provider<MockProvider>, LocalWallet>>,
        MockProvider,
    ) {
        let (provider, mock) = Provider::mocked();
        let wallet = DEPLOYER_SK.parse::<LocalWallet>().unwrap().with_chain_id(31337u64);
        let deploy = Deploy::with_client(Arc::new(SignerMiddleware::new(provider, wallet)));
        (deploy, mock)
    }

    /// Queues `responses` in request order; the mock serves the last pushed first.
    pub fn queue(mock: &MockProvider, responses: Vec<MockResponse>) {
        for response in responses.into_iter().rev() {
            mock.push_response(response);
        }
    }

    fn rejection() -> MockResponse {
        MockResponse::Error(JsonRpcError {
            code: -32000,
            message: "insufficient funds for gas * price + value".to_string(),
            data: None,
        })
    }

    /// A funded balance, then a node that rejects every request of the deployment.
    pub fn rejected_deployment() -> Vec<MockResponse> {
        let balance = MockResponse::Value(serde_json::to_value(U256::exp10(18)).unwrap());
        std::iter::once(balance)
            .chain(std::iter::repeat_with(rejection).take(4))
            .collect()
    }

    fn call_response(token: Token) -> MockResponse {
        let output = Bytes::from(abi::encode(&[token]));
        MockResponse::Value(serde_json::to_value(output).unwrap())
    }

    fn deployment() -> Deployment {
        Deployment {
            address: H160::repeat_byte(0x11),
            name: "AshNFT".to_string(),
            symbol: "ASH".to_string(),
            max_supply: U256::from(10_000),
            owner: H160::repeat_byte(0x22),
        }
    }

    #[test]
    fn matching_deployment_has_no_mismatches() {
        assert!(deployment()
            .mismatches(H160::repeat_byte(0x22), U256::from(10_000))
            .is_empty());
    }

    #[test]
    fn reports_owner_and_supply_mismatches() {
        let mismatches = deployment().mismatches(H160::repeat_byte(0x33), U256::from(5));
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches[0].starts_with("owner is"));
        assert!(mismatches[1].starts_with("max supply is 10000"));
    }

    #[test]
    fn signer_address_comes_from_wallet() {
        let (deploy, _mock) = mocked_deploy();
        let expected: H160 = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(deploy.signer_address().unwrap(), expected);
    }

    #[tokio::test]
    async fn reads_balance() {
        let (deploy, mock) = mocked_deploy();
        mock.push::<U256, _>(U256::exp10(18)).unwrap();

        let signer = deploy.signer_address().unwrap();
        assert_eq!(deploy.balance(signer).await.unwrap(), U256::exp10(18));
    }

    #[tokio::test]
    async fn rejected_deployment_is_an_error() {
        let (deploy, mock) = mocked_deploy();
        queue(&mock, rejected_deployment());

        let artifact = Artifact::from_json(ASHNFT_ARTIFACT).unwrap();
        let owner = deploy.signer_address().unwrap();
        let err = deploy
            .run(&artifact, owner, U256::from(10_000))
            .await
            .unwrap_err();
        assert!(format!("{:?}", err).contains("insufficient funds"));
    }

    #[tokio::test]
    async fn query_decodes_getters() {
        let (deploy, mock) = mocked_deploy();
        queue(
            &mock,
            vec![
                call_response(Token::String("AshNFT".to_string())),
                call_response(Token::String("ASH".to_string())),
                call_response(Token::Uint(U256::from(10_000))),
                call_response(Token::Address(H160::repeat_byte(0x22))),
            ],
        );

        let queried = deploy.query(H160::repeat_byte(0x11)).await.unwrap();
        assert_eq!(queried, deployment());
    }
}

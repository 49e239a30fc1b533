use ethers::contract::abigen;

abigen!(
    AshNFT,
    r#"[
        function NAME() external view returns (string)
        function SYMBOL() external view returns (string)
        function maxSupply() external view returns (uint256)
        function owner() external view returns (address)
    ]"#
);

use ethers::contract::abigen;

// Mintable, burnable ERC-20
abigen!(
    TokenContract,
    r#"[
        function name() view returns (string)
        function symbol() view returns (string)
        function decimals() view returns (uint8)
        function totalSupply() view returns (uint256)
        function balanceOf(address account) view returns (uint256)
        function mint(address to, uint256 amount)
        function transfer(address to, uint256 amount) returns (bool)
        function burn(uint256 amount)
    ]"#
);

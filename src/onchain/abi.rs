use alloy::sol;

// ── Contract interfaces probed by the batched read ───────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Multicall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calls) public payable returns (Result[] returnData);
        function getEthBalance(address addr) public view returns (uint256 balance);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }

    /// Getters that may or may not exist on a given staking contract.
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IStakeProbe {
        function principalOf(address account) external view returns (uint256);
        function stakedOf(address account) external view returns (uint256);
        function userInfo(address account) external view returns (bytes);
    }
}

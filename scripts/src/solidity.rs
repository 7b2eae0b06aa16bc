//! Definitions of Solidity functions called while wiring deployed contracts together

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IRelayerManager {
        function addRelayer(address relayer) external;
    }

    #[sol(rpc)]
    interface IInAuthenticator {
        function grantManager(address account) external;
        function grantSystem(address account) external;
    }

    #[sol(rpc)]
    interface IEduLedger {
        function initialize(address authenticator, address instructorLedger) external;
    }
}

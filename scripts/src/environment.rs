//! Resolution of the network & environment a script deploys to

use deploy_common::{
    constants::{LOCALHOST_NETWORK_NAME, LOCAL_NETWORK_ID, NETWORK_ID_SEPARATOR},
    types::{DeploymentTarget, EnvironmentTag, TagScheme},
};

/// Resolve the deployment target for the active network.
///
/// The local simulation network always resolves to `localhost` in the
/// non-production environment. Any other network id contributes the part
/// before its first `_` as the network name, and the environment is
/// production only if `env_override` is exactly the scheme's production
/// label. Unset or unrecognized overrides fall back to non-production.
pub fn resolve_target(
    network_id: &str,
    env_override: Option<&str>,
    scheme: TagScheme,
) -> DeploymentTarget {
    if network_id == LOCAL_NETWORK_ID {
        return DeploymentTarget {
            network_name: LOCALHOST_NETWORK_NAME.to_string(),
            environment: EnvironmentTag::NonProduction,
            scheme,
        };
    }

    let network_name = network_id
        .split_once(NETWORK_ID_SEPARATOR)
        .map_or(network_id, |(name, _chain_env)| name);

    let environment = match env_override {
        Some(env) if env == scheme.production_label() => EnvironmentTag::Production,
        _ => EnvironmentTag::NonProduction,
    };

    DeploymentTarget {
        network_name: network_name.to_string(),
        environment,
        scheme,
    }
}

#[cfg(test)]
mod tests {
    use deploy_common::types::{EnvironmentTag, TagScheme};

    use super::resolve_target;

    #[test]
    fn test_local_network_ignores_override() {
        for env in [None, Some(""), Some("prod"), Some("production")] {
            let target = resolve_target("hardhat", env, TagScheme::LocalProd);
            assert_eq!(target.network_name, "localhost");
            assert_eq!(target.environment, EnvironmentTag::NonProduction);
            assert_eq!(target.environment_label(), "local");
        }
    }

    #[test]
    fn test_network_name_split() {
        let target = resolve_target("kaia_test", None, TagScheme::LocalProd);
        assert_eq!(target.network_name, "kaia");

        // Only the first separator splits
        let target = resolve_target("kaia_test_v2", None, TagScheme::LocalProd);
        assert_eq!(target.network_name, "kaia");

        let target = resolve_target("sepolia", None, TagScheme::LocalProd);
        assert_eq!(target.network_name, "sepolia");
    }

    #[test]
    fn test_production_requires_exact_match() {
        let env_of = |env, scheme| resolve_target("kaia_test", env, scheme).environment;

        assert_eq!(
            env_of(Some("prod"), TagScheme::LocalProd),
            EnvironmentTag::Production
        );
        assert_eq!(
            env_of(Some("production"), TagScheme::DevelopmentProduction),
            EnvironmentTag::Production
        );

        let not_production = [
            None,
            Some(""),
            Some("PROD"),
            Some("Prod"),
            Some("production"),
            Some("local"),
        ];
        for env in not_production {
            let environment = env_of(env, TagScheme::LocalProd);
            assert_eq!(environment, EnvironmentTag::NonProduction);
        }
        assert_eq!(
            env_of(Some("prod"), TagScheme::DevelopmentProduction),
            EnvironmentTag::NonProduction
        );
    }

    #[test]
    fn test_chain_env_suffix_is_not_the_environment() {
        let target = resolve_target("kaia_prod", None, TagScheme::LocalProd);
        assert_eq!(target.environment, EnvironmentTag::NonProduction);
    }
}

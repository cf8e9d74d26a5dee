use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_NODE_ADDR: &str = "127.0.0.1:7777";
const DEFAULT_PRIME_BITS: u64 = 400;
const DEFAULT_PRIME_CERTAINTY: u32 = 100;

const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
const PRIME_BITS_KEY: &str = "RSA_PRIME_BITS";
const PRIME_CERTAINTY_KEY: &str = "RSA_PRIME_CERTAINTY";

pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let mut map = HashMap::new();

        let mut node_addr = String::from(DEFAULT_NODE_ADDR);
        if let Ok(addr) = env::var(NODE_ADDRESS_KEY) {
            node_addr = addr;
        }
        map.insert(String::from(NODE_ADDRESS_KEY), node_addr);

        if let Ok(bits) = env::var(PRIME_BITS_KEY) {
            map.insert(String::from(PRIME_BITS_KEY), bits);
        }
        if let Ok(certainty) = env::var(PRIME_CERTAINTY_KEY) {
            map.insert(String::from(PRIME_CERTAINTY_KEY), certainty);
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    pub fn get_node_addr(&self) -> String {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(NODE_ADDRESS_KEY)
            .expect("Node address should always be present in config")
            .clone()
    }

    pub fn set_node_addr(&self, addr: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on config - this should never happen");
        inner.insert(String::from(NODE_ADDRESS_KEY), addr);
    }

    /// Bit length of each RSA prime generated for a client session.
    pub fn get_prime_bits(&self) -> u64 {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(PRIME_BITS_KEY)
            .and_then(|bits| bits.parse().ok())
            .unwrap_or(DEFAULT_PRIME_BITS)
    }

    /// Certainty parameter for the probable-prime search; the chance a
    /// generated number is composite does not exceed 2^-certainty.
    pub fn get_prime_certainty(&self) -> u32 {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(PRIME_CERTAINTY_KEY)
            .and_then(|certainty| certainty.parse().ok())
            .unwrap_or(DEFAULT_PRIME_CERTAINTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert!(!config.get_node_addr().is_empty());
        assert!(config.get_prime_bits() >= 256);
        assert!(config.get_prime_certainty() > 0);
    }

    #[test]
    fn test_set_node_addr() {
        let config = Config::new();
        config.set_node_addr(String::from("127.0.0.1:9999"));
        assert_eq!(config.get_node_addr(), "127.0.0.1:9999");
    }
}

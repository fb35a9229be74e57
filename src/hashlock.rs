use near_sdk::{env, near, CryptoHash};

/// Hash used to bind a lock to its secret.
///
/// The party generating the secret must compute the commitment with the same
/// function the contract was initialised with.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HashFunction {
    #[default]
    Sha256,
    // Matches EVM-side HTLCs, which commit with keccak256.
    Keccak256,
}

impl HashFunction {
    pub fn digest(&self, pre_image: &[u8]) -> CryptoHash {
        match self {
            HashFunction::Sha256 => env::sha256_array(pre_image),
            HashFunction::Keccak256 => env::keccak256_array(pre_image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    #[test]
    fn sha256_matches_off_chain_digest() {
        let secret = b"buzz";
        let expected: CryptoHash = Sha256::digest(secret).into();
        assert_eq!(HashFunction::Sha256.digest(secret), expected);
    }

    #[test]
    fn functions_disagree() {
        let secret = [0x62, 0x75, 0x7a, 0x7a];
        assert_ne!(
            HashFunction::Sha256.digest(&secret),
            HashFunction::Keccak256.digest(&secret)
        );
    }
}

//! The alphabet module contains an implementation of the [TraceProvider] trait for the
//! alphabet VM, whose trace is a sequence of letters.

use super::{Position, PreimageOracleData, TraceProvider, TraceValue};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::{
    abi::{self, Token},
    types::{Bytes, H256, U256},
    utils::keccak256,
};
use std::sync::Arc;

/// The state the alphabet VM starts from: the letter before `a`.
pub const ALPHABET_ABSOLUTE_PRESTATE: u8 = 0x60;

/// A [TraceProvider] over an in-memory alphabet trace.
#[derive(Debug, Clone)]
pub struct AlphabetTraceProvider {
    /// The maximum depth of the game tree.
    max_depth: u8,
    /// Our full execution trace. Indices past the end hold the final letter.
    trace: Arc<[u8]>,
}

impl AlphabetTraceProvider {
    /// Creates a new [AlphabetTraceProvider].
    pub fn new(trace: impl Into<Arc<[u8]>>, max_depth: u8) -> Result<Self> {
        let trace = trace.into();
        if trace.is_empty() {
            return Err(anyhow!("Alphabet trace must not be empty"));
        }
        Ok(Self { max_depth, trace })
    }

    /// Returns the letter at the given trace index.
    pub fn state_at(&self, trace_index: u64) -> u8 {
        let last = self.trace.len() - 1;
        let index = usize::try_from(trace_index).map_or(last, |i| i.min(last));
        self.trace[index]
    }

    /// Returns the ABI encoded preimage of the state at the given trace index.
    pub fn preimage_at(&self, trace_index: u64) -> Bytes {
        abi::encode(&[
            Token::Uint(U256::from(trace_index)),
            Token::Uint(U256::from(self.state_at(trace_index))),
        ])
        .into()
    }

    fn trace_index(&self, position: Position) -> Result<u64> {
        Ok(position.trace_index(self.max_depth)?)
    }
}

#[async_trait]
impl TraceProvider for AlphabetTraceProvider {
    async fn get(&self, position: Position) -> Result<TraceValue> {
        let trace_index = self.trace_index(position)?;
        Ok(H256::from(keccak256(self.preimage_at(trace_index))))
    }

    async fn get_step_data(
        &self,
        position: Position,
    ) -> Result<(Bytes, Bytes, Option<PreimageOracleData>)> {
        let trace_index = self.trace_index(position)?;

        // The step ending at trace index `i` starts from the state at `i - 1`. The very first
        // step starts from the absolute prestate.
        let pre_state = match trace_index.checked_sub(1) {
            Some(pre_index) => self.preimage_at(pre_index),
            None => self.absolute_prestate().await?,
        };
        Ok((pre_state, Bytes::default(), None))
    }

    async fn absolute_prestate(&self) -> Result<Bytes> {
        Ok(abi::encode(&[Token::Uint(U256::from(ALPHABET_ABSOLUTE_PRESTATE))]).into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MAX_DEPTH: u8 = 4;

    fn provider() -> AlphabetTraceProvider {
        AlphabetTraceProvider::new(b"abcdefghijklmnop".to_vec(), MAX_DEPTH).unwrap()
    }

    #[tokio::test]
    async fn values_commit_to_trace_index() {
        let provider = provider();
        let leaf = Position::new(MAX_DEPTH, 3).unwrap();
        let expected = keccak256(abi::encode(&[
            Token::Uint(U256::from(3u64)),
            Token::Uint(U256::from(b'd')),
        ]));
        assert_eq!(provider.get(leaf).await.unwrap(), H256::from(expected));

        // The root commits to the final trace index, shared with the rightmost leaf.
        let last_leaf = Position::new(MAX_DEPTH, 15).unwrap();
        assert_eq!(
            provider.get(Position::ROOT).await.unwrap(),
            provider.get(last_leaf).await.unwrap()
        );
    }

    #[tokio::test]
    async fn step_data_uses_previous_state() {
        let provider = provider();

        let (pre_state, proof, oracle) = provider
            .get_step_data(Position::new(MAX_DEPTH, 5).unwrap())
            .await
            .unwrap();
        assert_eq!(pre_state, provider.preimage_at(4));
        assert!(proof.is_empty());
        assert!(oracle.is_none());

        let (pre_state, _, _) = provider
            .get_step_data(Position::new(MAX_DEPTH, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(pre_state, provider.absolute_prestate().await.unwrap());
    }

    #[test]
    fn short_traces_hold_their_final_state() {
        let provider = AlphabetTraceProvider::new(b"abc".to_vec(), MAX_DEPTH).unwrap();
        assert_eq!(provider.state_at(2), b'c');
        assert_eq!(provider.state_at(15), b'c');
        assert!(AlphabetTraceProvider::new(Vec::new(), MAX_DEPTH).is_err());
    }

    #[tokio::test]
    async fn rejects_positions_below_max_depth() {
        let provider = provider();
        let too_deep = Position::new(MAX_DEPTH + 1, 0).unwrap();
        assert!(provider.get(too_deep).await.is_err());
    }
}

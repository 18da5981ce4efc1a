// State for analysing one ciphertext: its frequencies, the working decryption
// map, and the last key the attack recovered.

use num_bigint::BigUint;

use crate::{
    attack, frequency_table, ngram_table, AttackConfig, AttackFailure, Ciphertext,
    DecryptionMap, FrequencyTable, KeyGuess, NgramEntry, OverrideError,
};

#[derive(Debug, Clone)]
pub struct AnalysisSession {
    ciphertext: Ciphertext,
    config: AttackConfig,
    frequencies: FrequencyTable,
    decryption: DecryptionMap,
    key: Option<KeyGuess>,
}

impl AnalysisSession {
    pub fn new(ciphertext: Ciphertext, config: AttackConfig) -> Self {
        let frequencies = frequency_table(&ciphertext);
        Self {
            ciphertext,
            config,
            frequencies,
            decryption: DecryptionMap::new(),
            key: None,
        }
    }

    pub fn ciphertext(&self) -> &Ciphertext {
        &self.ciphertext
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn decryption(&self) -> &DecryptionMap {
        &self.decryption
    }

    pub fn key(&self) -> Option<&KeyGuess> {
        self.key.as_ref()
    }

    pub fn ngrams(&self, n: usize) -> Vec<NgramEntry> {
        ngram_table(&self.ciphertext, n)
    }

    /// Replace the decryption map with a pure frequency guess: the n-th most
    /// common block becomes the n-th most common English letter.
    pub fn analyse(&mut self) {
        self.frequencies = frequency_table(&self.ciphertext);
        self.decryption = DecryptionMap::from_frequencies(&self.frequencies);
        self.key = None;
    }

    /// Run the key recovery attack. On success the decryption map is rebuilt
    /// from the recovered key; on failure both the map and the key are cleared.
    pub fn run_attack(&mut self) -> Result<&KeyGuess, AttackFailure> {
        self.frequencies = frequency_table(&self.ciphertext);
        match attack(&self.ciphertext, &self.config) {
            Ok(recovered) => {
                self.decryption = recovered.decryption;
                Ok(&*self.key.insert(recovered.key))
            }
            Err(failure) => {
                log::debug!("attack failed: {failure}");
                self.decryption = DecryptionMap::new();
                self.key = None;
                Err(failure)
            }
        }
    }

    /// Manually map a block of this ciphertext to a letter.
    pub fn assign(&mut self, block: BigUint, letter: char) -> Result<Option<char>, OverrideError> {
        if !self.ciphertext.contains_block(&block) {
            return Err(OverrideError::UnknownBlock(block));
        }
        self.decryption.assign(block, letter)
    }

    /// Manually unmap a block.
    pub fn clear(&mut self, block: &BigUint) -> Option<char> {
        self.decryption.clear(block)
    }

    /// Drop every mapping and the recovered key.
    pub fn reset(&mut self) {
        self.decryption = DecryptionMap::new();
        self.key = None;
    }

    pub fn decrypted_text(&self) -> String {
        self.decryption.render(&self.ciphertext)
    }
}

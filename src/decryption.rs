// Mapping from cipher blocks to the letters they are believed to encrypt.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::{
    rsa_apply, CipherElement, Ciphertext, FrequencyTable, OverrideError,
    ENGLISH_LETTER_FREQUENCIES,
};

pub const UNMAPPED: char = '_';

/// Each block maps to at most one upper-case letter, or is unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptionMap {
    letters: BTreeMap<BigUint, char>,
}

impl DecryptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair the n-th most frequent block with the n-th most frequent English
    /// letter. Blocks beyond the 26th stay unmapped.
    pub fn from_frequencies(table: &FrequencyTable) -> Self {
        let letters = table
            .entries()
            .iter()
            .zip(ENGLISH_LETTER_FREQUENCIES)
            .map(|(entry, (letter, _))| (entry.block.clone(), letter))
            .collect();
        Self { letters }
    }

    /// Decrypt every distinct block of `ciphertext` with `(d, n)`. Blocks that
    /// do not decrypt to a code in A-Z stay unmapped.
    pub fn from_key(ciphertext: &Ciphertext, d: &BigUint, n: &BigUint) -> Self {
        let letters = ciphertext
            .unique_blocks()
            .into_iter()
            .filter_map(|block| {
                let letter = rsa_apply(d, n, block)
                    .to_u32()
                    .and_then(char::from_u32)
                    .filter(char::is_ascii_uppercase)?;
                Some((block.clone(), letter))
            })
            .collect();
        Self { letters }
    }

    pub fn get(&self, block: &BigUint) -> Option<char> {
        self.letters.get(block).copied()
    }

    /// Map `block` to `letter`, replacing any earlier mapping. Lower-case
    /// letters are accepted and stored upper-cased. Returns the previous letter.
    pub fn assign(&mut self, block: BigUint, letter: char) -> Result<Option<char>, OverrideError> {
        if !letter.is_ascii_alphabetic() {
            return Err(OverrideError::NotALetter(letter));
        }
        Ok(self.letters.insert(block, letter.to_ascii_uppercase()))
    }

    /// Unmap `block`, returning the letter it had.
    pub fn clear(&mut self, block: &BigUint) -> Option<char> {
        self.letters.remove(block)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BigUint, char)> {
        self.letters.iter().map(|(block, letter)| (block, *letter))
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// The ciphertext with each block replaced by its letter, or `_` when the
    /// block is unmapped. Passthrough characters are copied as they are.
    pub fn render(&self, ciphertext: &Ciphertext) -> String {
        ciphertext
            .elements()
            .iter()
            .map(|element| match element {
                CipherElement::Block(block) => self.get(block).unwrap_or(UNMAPPED),
                CipherElement::Passthrough(ch) => *ch,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{encrypt_text, frequency_table, generate_key_pair};

    fn big(value: u64) -> BigUint {
        BigUint::from(value)
    }

    #[test]
    fn render_marks_unmapped_blocks() {
        let text: Ciphertext = "[7][8] [9]!".parse().unwrap();
        let mut map = DecryptionMap::new();
        map.assign(big(7), 'H').unwrap();
        map.assign(big(9), 'I').unwrap();

        assert_eq!(map.render(&text), "H_ I!");
    }

    #[test]
    fn assign_replaces_and_upper_cases() {
        let mut map = DecryptionMap::new();

        assert_eq!(map.assign(big(7), 'a'), Ok(None));
        assert_eq!(map.assign(big(7), 'b'), Ok(Some('A')));
        assert_eq!(map.get(&big(7)), Some('B'));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn assign_rejects_non_letters() {
        let mut map = DecryptionMap::new();

        assert_eq!(map.assign(big(7), '3'), Err(OverrideError::NotALetter('3')));
        assert_eq!(map.assign(big(7), '_'), Err(OverrideError::NotALetter('_')));
        assert!(map.is_empty());
    }

    #[test]
    fn clear_unmaps_block() {
        let mut map = DecryptionMap::new();
        map.assign(big(7), 'Q').unwrap();

        assert_eq!(map.clear(&big(7)), Some('Q'));
        assert_eq!(map.clear(&big(7)), None);
        assert_eq!(map.get(&big(7)), None);
    }

    #[test]
    fn from_frequencies_follows_english_ranking() {
        let text: Ciphertext = "[4][4][4][5][5][6]".parse().unwrap();

        let map = DecryptionMap::from_frequencies(&frequency_table(&text));

        assert_eq!(map.render(&text), "EEETTA");
    }

    #[test]
    fn from_key_decrypts_every_block() {
        let keys = generate_key_pair(17, 19).unwrap();
        let text = encrypt_text("HELLO, WORLD", &keys.public, &keys.n);

        let map = DecryptionMap::from_key(&text, &keys.private, &keys.n);

        assert_eq!(map.len(), 7);
        assert_eq!(map.render(&text), "HELLO, WORLD");
    }

    #[test]
    fn from_key_leaves_non_letters_unmapped() {
        // 2^173 mod 323 does not land on a letter code.
        let keys = generate_key_pair(17, 19).unwrap();
        let text: Ciphertext = "[2]".parse().unwrap();
        let decrypted = rsa_apply(&keys.private, &keys.n, &big(2));
        assert!(!(65u64..=90).contains(&decrypted.to_u64().unwrap()));

        let map = DecryptionMap::from_key(&text, &keys.private, &keys.n);

        assert!(map.is_empty());
        assert_eq!(map.render(&text), "_");
    }
}

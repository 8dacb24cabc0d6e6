//! Legacy Solana wire format for a single System Program transfer.
//!
//! Message layout:
//! `header(3) ‖ compact(keys) ‖ keys ‖ blockhash(32) ‖ compact(ixs) ‖ ixs`
//!
//! Transaction layout: `compact(sigs) ‖ sig(64)... ‖ message`

/// System Program id (`11111111111111111111111111111111`).
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// `SystemInstruction::Transfer` discriminator.
const TRANSFER_INSTRUCTION: u32 = 2;

/// Unsigned transfer of `lamports` from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaMessage {
    pub from: [u8; 32],
    pub to: [u8; 32],
    pub lamports: u64,
    pub recent_blockhash: [u8; 32],
}

impl SolanaMessage {
    /// Account keys in message order: signer first, then the recipient if
    /// distinct, then the program.
    fn account_keys(&self) -> Vec<[u8; 32]> {
        let mut keys = vec![self.from];
        if self.to != self.from {
            keys.push(self.to);
        }
        keys.push(SYSTEM_PROGRAM_ID);
        keys
    }

    /// Serializes the message exactly as it is signed.
    pub fn serialize(&self) -> Vec<u8> {
        let keys = self.account_keys();
        let to_index = if self.to != self.from { 1u8 } else { 0u8 };
        let program_index = (keys.len() - 1) as u8;

        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&TRANSFER_INSTRUCTION.to_le_bytes());
        data.extend_from_slice(&self.lamports.to_le_bytes());

        let mut out = Vec::with_capacity(3 + 1 + keys.len() * 32 + 32 + 1 + 4 + data.len() + 1);
        // one signer, no readonly signers, the program is readonly unsigned
        out.extend_from_slice(&[1, 0, 1]);

        encode_compact_u16(keys.len() as u16, &mut out);
        for key in &keys {
            out.extend_from_slice(key);
        }
        out.extend_from_slice(&self.recent_blockhash);

        encode_compact_u16(1, &mut out);
        out.push(program_index);
        encode_compact_u16(2, &mut out);
        out.push(0);
        out.push(to_index);
        encode_compact_u16(data.len() as u16, &mut out);
        out.extend_from_slice(&data);
        out
    }
}

/// Prepends the signature list to a serialized message.
pub fn encode_transaction(signature: &[u8; 64], message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 64 + message.len());
    encode_compact_u16(1, &mut out);
    out.extend_from_slice(signature);
    out.extend_from_slice(message);
    out
}

/// Solana's "shortvec" length prefix: 7 bits per byte, high bit continues.
pub fn encode_compact_u16(mut value: u16, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: [u8; 32]) -> SolanaMessage {
        SolanaMessage { from: [1u8; 32], to, lamports: 1_000, recent_blockhash: [9u8; 32] }
    }

    #[test]
    fn test_compact_u16() {
        let cases: [(u16, &[u8]); 5] = [
            (0, &[0x00]),
            (0x7f, &[0x7f]),
            (0x80, &[0x80, 0x01]),
            (0x3fff, &[0xff, 0x7f]),
            (0xffff, &[0xff, 0xff, 0x03]),
        ];
        for (value, expected) in cases {
            let mut out = Vec::new();
            encode_compact_u16(value, &mut out);
            assert_eq!(out, expected, "value {:#x}", value);
        }
    }

    #[test]
    fn test_transfer_layout() {
        let bytes = message([2u8; 32]).serialize();
        // header + len + 3 keys + blockhash + ix count + program idx + 2 accounts + data
        assert_eq!(bytes.len(), 3 + 1 + 96 + 32 + 1 + 1 + 3 + 1 + 12);
        assert_eq!(&bytes[..4], &[1, 0, 1, 3]);
        assert_eq!(&bytes[4..36], &[1u8; 32]);
        assert_eq!(&bytes[36..68], &[2u8; 32]);
        assert_eq!(&bytes[68..100], &SYSTEM_PROGRAM_ID);
        assert_eq!(&bytes[100..132], &[9u8; 32]);

        let ix = &bytes[132..];
        assert_eq!(&ix[..6], &[1, 2, 2, 0, 1, 12]);
        assert_eq!(&ix[6..10], &2u32.to_le_bytes());
        assert_eq!(&ix[10..18], &1_000u64.to_le_bytes());
    }

    #[test]
    fn test_self_transfer_dedupes_keys() {
        let bytes = message([1u8; 32]).serialize();
        assert_eq!(&bytes[..4], &[1, 0, 1, 2]);
        let ix = &bytes[4 + 64 + 32..];
        assert_eq!(&ix[..6], &[1, 1, 2, 0, 0, 12]);
    }

    #[test]
    fn test_transaction_prefix() {
        let tx = encode_transaction(&[7u8; 64], &[0xaa, 0xbb]);
        assert_eq!(tx.len(), 1 + 64 + 2);
        assert_eq!(tx[0], 1);
        assert_eq!(&tx[65..], &[0xaa, 0xbb]);
    }
}

/// A trail entry which can be flattened to a fixed number of bytes so that a
/// block of entries can be handed to a packer.
pub(crate) trait TrailEntry: Copy + Default {
    const ENCODED_SIZE: usize;

    fn encode(self, out: &mut Vec<u8>);

    fn decode(bytes: &[u8]) -> Self;
}

/// An address/value cell: the slot a primitive lived in and the value it held
/// before the most recent modification. Restored by writing `old` back into
/// `slot`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AddrVal<V> {
    pub(crate) slot: u32,
    pub(crate) old: V,
}

impl<V> AddrVal<V> {
    pub(crate) fn new(slot: u32, old: V) -> AddrVal<V> {
        AddrVal { slot, old }
    }
}

impl TrailEntry for AddrVal<i32> {
    const ENCODED_SIZE: usize = 8;

    fn encode(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.slot.to_le_bytes());
        out.extend_from_slice(&self.old.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        AddrVal {
            slot: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            old: i32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }
}

impl TrailEntry for AddrVal<i64> {
    const ENCODED_SIZE: usize = 12;

    fn encode(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.slot.to_le_bytes());
        out.extend_from_slice(&self.old.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        AddrVal {
            slot: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            old: i64::from_le_bytes(bytes[4..12].try_into().unwrap()),
        }
    }
}

impl TrailEntry for AddrVal<u64> {
    const ENCODED_SIZE: usize = 12;

    fn encode(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.slot.to_le_bytes());
        out.extend_from_slice(&self.old.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        AddrVal {
            slot: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            old: u64::from_le_bytes(bytes[4..12].try_into().unwrap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_round_trips() {
        let cell = AddrVal::new(17, -12345_i64);
        let mut bytes = Vec::new();
        cell.encode(&mut bytes);
        assert_eq!(bytes.len(), <AddrVal<i64> as TrailEntry>::ENCODED_SIZE);
        assert_eq!(AddrVal::<i64>::decode(&bytes), cell);
    }
}

use super::entry::TrailEntry;
use super::packer::BlockPacker;
use crate::kabocha_assert_moderate;
use crate::options::TrailCompression;

/// A stack of trail cells split into fixed-size blocks, of which at most two
/// (the hot `data` block and the warm `buffer` block) are uncompressed at any
/// time; every older block is held in its packed form.
///
/// Deep searches write most cells once and only read them back at the final
/// unwind, so keeping cold blocks packed bounds peak memory. Emptied block
/// buffers are recycled through a free list so the stack does not churn
/// allocations while the search grows and shrinks across sibling branches.
pub(crate) struct CompressedStack<T> {
    block_size: usize,
    packer: BlockPacker,
    /// Packed blocks, most recent last.
    blocks: Vec<Vec<u8>>,
    /// Recycled buffers for future packed blocks.
    free_blocks: Vec<Vec<u8>>,
    /// The hot block; cells `[0, current)` are live.
    data: Vec<T>,
    /// The warm block, holding the previous `block_size` cells when
    /// `buffer_used` is set.
    buffer: Vec<T>,
    buffer_used: bool,
    current: usize,
    size: usize,
    /// Scratch space for the raw encoding of one block.
    scratch: Vec<u8>,
}

impl<T: TrailEntry> CompressedStack<T> {
    pub(crate) fn new(block_size: usize, compression: TrailCompression) -> CompressedStack<T> {
        kabocha_assert_moderate!(block_size > 0);
        CompressedStack {
            block_size,
            packer: BlockPacker::from_options(compression),
            blocks: Vec::new(),
            free_blocks: Vec::new(),
            data: vec![T::default(); block_size],
            buffer: vec![T::default(); block_size],
            buffer_used: false,
            current: 0,
            size: 0,
            scratch: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }

    /// The most recently pushed cell. Must not be called on an empty stack.
    pub(crate) fn back(&self) -> T {
        kabocha_assert_moderate!(self.current > 0, "back() called on an empty trail block");
        self.data[self.current - 1]
    }

    pub(crate) fn push(&mut self, cell: T) {
        if self.current >= self.block_size {
            if self.buffer_used {
                // The warm block has to make room: pack it onto the block
                // stack, then rotate the hot block into its place.
                self.pack_buffer();
                std::mem::swap(&mut self.data, &mut self.buffer);
            } else {
                std::mem::swap(&mut self.data, &mut self.buffer);
                self.buffer_used = true;
            }
            self.current = 0;
        }
        self.data[self.current] = cell;
        self.current += 1;
        self.size += 1;
    }

    pub(crate) fn pop(&mut self) {
        if self.size == 0 {
            return;
        }
        self.current -= 1;
        if self.current == 0 {
            if self.buffer_used {
                std::mem::swap(&mut self.data, &mut self.buffer);
                self.current = self.block_size;
                self.buffer_used = false;
            } else if let Some(packed) = self.blocks.pop() {
                self.unpack_into_data(&packed);
                self.free_blocks.push(packed);
                self.current = self.block_size;
            }
        }
        self.size -= 1;
    }

    pub(crate) fn memory_usage_bytes(&self) -> usize {
        let uncompressed = 2 * self.block_size * std::mem::size_of::<T>();
        let packed: usize = self
            .blocks
            .iter()
            .chain(self.free_blocks.iter())
            .map(|block| block.capacity())
            .sum();
        uncompressed + packed + self.scratch.capacity()
    }

    fn pack_buffer(&mut self) {
        self.scratch.clear();
        for cell in &self.buffer {
            cell.encode(&mut self.scratch);
        }
        let mut packed = self.free_blocks.pop().unwrap_or_default();
        self.packer.pack(&self.scratch, &mut packed);
        self.blocks.push(packed);
    }

    fn unpack_into_data(&mut self, packed: &[u8]) {
        self.packer.unpack(packed, &mut self.scratch);
        kabocha_assert_moderate!(self.scratch.len() == self.block_size * T::ENCODED_SIZE);
        for (index, chunk) in self.scratch.chunks_exact(T::ENCODED_SIZE).enumerate() {
            self.data[index] = T::decode(chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::Rng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::trail::AddrVal;

    fn stack(compression: TrailCompression) -> CompressedStack<AddrVal<i64>> {
        CompressedStack::new(8, compression)
    }

    #[test]
    fn cells_come_back_in_lifo_order_across_block_boundaries() {
        let mut stack = stack(TrailCompression::None);

        for value in 0..100_i64 {
            stack.push(AddrVal::new(value as u32, value));
        }
        assert_eq!(stack.len(), 100);

        for value in (0..100_i64).rev() {
            assert_eq!(stack.back(), AddrVal::new(value as u32, value));
            stack.pop();
        }
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn emptied_blocks_are_recycled() {
        let mut stack = stack(TrailCompression::None);

        // Three full blocks: one packed, one warm, one hot.
        for value in 0..24_i64 {
            stack.push(AddrVal::new(0, value));
        }
        assert_eq!(stack.blocks.len(), 1);

        for _ in 0..24 {
            stack.pop();
        }
        assert_eq!(stack.blocks.len(), 0);
        assert_eq!(stack.free_blocks.len(), 1);

        // Growing again reuses the freed block buffer.
        for value in 0..24_i64 {
            stack.push(AddrVal::new(0, value));
        }
        assert!(stack.free_blocks.is_empty());
    }

    /// The observable behaviour (sequence of `back()` values and final size)
    /// must be identical across compression modes for any push/pop sequence.
    #[test]
    fn compression_modes_are_observationally_equivalent() {
        let mut rng = SmallRng::seed_from_u64(0xDECAF);
        let mut reference = stack(TrailCompression::None);
        let mut compressed = stack(TrailCompression::Zlib);

        let mut live = 0_usize;
        for step in 0..100_000 {
            if live > 0 && rng.gen_bool(0.45) {
                assert_eq!(reference.back(), compressed.back(), "step {step}");
                reference.pop();
                compressed.pop();
                live -= 1;
            } else {
                let cell = AddrVal::new(rng.gen::<u32>() % 1000, rng.gen::<i64>());
                reference.push(cell);
                compressed.push(cell);
                live += 1;
            }
            assert_eq!(reference.len(), compressed.len());
        }

        assert_eq!(reference.len(), live);
        while live > 0 {
            assert_eq!(reference.back(), compressed.back());
            reference.pop();
            compressed.pop();
            live -= 1;
        }
    }
}

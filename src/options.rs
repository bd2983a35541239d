use rand::rngs::SmallRng;
use rand::SeedableRng;

#[cfg(doc)]
use crate::Solver;

/// Compression scheme applied to cold trail blocks.
///
/// On deep searches most trail entries are written once and only read back at
/// the final unwind; compressing the blocks that are no longer hot trades a
/// little CPU for a large reduction in peak memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailCompression {
    /// Cold blocks are stored as raw bytes.
    #[default]
    None,
    /// Cold blocks are deflated with zlib.
    Zlib,
}

/// How much demon instrumentation the solver performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileLevel {
    #[default]
    None,
    /// Count runs and time per demon, reported through the statistics sink.
    Normal,
}

/// How much propagation tracing the solver performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceLevel {
    #[default]
    None,
    /// Log every domain modification and demon run at debug level.
    Normal,
}

/// Configuration of a [`Solver`], fixed at construction.
#[derive(Debug)]
pub struct SolverOptions {
    /// Compression applied to cold trail blocks.
    pub trail_compression: TrailCompression,
    /// Number of cells per trail block.
    pub trail_block_size: usize,
    /// Above this size, array constraints are split into a balanced tree of
    /// smaller ones by the modelling layer.
    pub array_split_size: usize,
    /// When false, [`Solver::set_object_name`] is a no-op and no name storage
    /// is kept.
    pub store_names: bool,
    /// Demon profiling level.
    pub profile_level: ProfileLevel,
    /// Propagation tracing level.
    pub trace_level: TraceLevel,
    /// When true, anonymous objects are lazily given names minted from their
    /// base prefix the first time their name is requested.
    pub name_all_variables: bool,
    /// The random generator used by the solver; passing it in allows seeding
    /// from external input.
    pub random_generator: SmallRng,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            trail_compression: TrailCompression::default(),
            trail_block_size: 8000,
            array_split_size: 16,
            store_names: true,
            profile_level: ProfileLevel::default(),
            trace_level: TraceLevel::default(),
            name_all_variables: false,
            random_generator: SmallRng::seed_from_u64(42),
        }
    }
}

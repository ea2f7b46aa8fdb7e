use crate::output_type::OutputType;

/// Options that control how a document is transcoded.
///
/// This struct is *library-level configuration*, not CLI flags directly. The CLI maps user
/// input into this type so other frontends (tests, batch jobs) can build it programmatically.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    /// The subtitle format to emit.
    pub output_type: OutputType,
}

pub mod mama;
pub use mama::{
    mama, MamaBatchBuilder, MamaBatchOutput, MamaBatchRange, MamaBuilder, MamaError, MamaInput,
    MamaOutput, MamaParams, MamaStream,
};

//! Asset pipeline and viewer lifecycle
//!
//! Raw asset → [`loader`] → [`normalize`] → [`pairing`] → live scene, with
//! [`recolor`] and [`viewport`] acting on the result afterwards.

pub mod loader;
pub mod model_viewer;
pub mod normalize;
pub mod pairing;
pub mod recolor;
pub mod viewport;

pub use loader::{AssetFormat, AssetLoader, FileAssetLoader, StockFinish};
pub use model_viewer::{LoadCompletion, LoadReport, ModelViewer, PendingLoad, ViewerState};
pub use normalize::{EmptyGeometry, NormalizedNode};
pub use pairing::PresentedObject;
pub use recolor::{ColorPreset, UnknownPreset};
pub use viewport::ViewportResponder;

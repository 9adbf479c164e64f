pub mod pcm;
pub mod recorder;

pub use recorder::SessionRecorder;

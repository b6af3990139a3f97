mod step_vm;

pub use step_vm::{FieldVm, NoticeVm, OptionTileVm, StepVm, VideoVm};

//! Core library for the light show studio.
//!
//! Turns a list of timeline events placed against an audio track into the
//! FSEQ v2 byte stream played back by the vehicle firmware. Data flows one
//! way: events are resolved against the static part table, evaluated frame by
//! frame into a channel matrix, and serialized behind a fixed header. The
//! budget report reads the same events independently and never gates export.

pub mod budget;
pub mod closure;
pub mod config;
pub mod error;
pub mod event;
pub mod fseq;
pub mod intensity;
pub mod mapping;
pub mod share;
pub mod timeline;

pub use budget::{command_cost, BudgetReport, PartUsage};
pub use closure::{resolve, Command, Directive};
pub use config::{AppConfig, ExportConfig};
pub use error::{Result, ShowError};
pub use event::{Effect, Event, FlapMode, LightParams, Payload, RetroMode, TrunkMode, WindowMode};
pub use fseq::{encode, export_show, ExportedShow, FseqHeader};
pub use intensity::intensity;
pub use mapping::{Category, ChannelKind, Part, PartKey, PartSpec};
pub use share::{parse_event_list, ShowFile};
pub use timeline::{compile, FrameMatrix, Transition, CHANNEL_COUNT, STEP_MS};

//! Scribely - clinical dictation and transcription client
//!
//! Records dictations from the microphone (or takes existing audio
//! files), submits them to a Scribely transcription server, follows the
//! transcription job until it resolves, and can turn a finished
//! transcript into a clinical note.
//!
//! Layout is hexagonal: `domain` holds the value objects and the two
//! state machines (recording session, transcription job), `application`
//! holds the use cases and the port traits they depend on, and
//! `infrastructure` implements those ports against cpal, flacenc, the
//! Scribely HTTP API, and the XDG config file. `cli` is the binary's
//! front end.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

//! # class-browser
//!
//! Headless core of a Java class file browser: classpath-aware class
//! resolution plus the session and navigation state that depends on it.
//!
//! ## Architecture
//!
//! - **entry**: Classpath entry kinds, class locations and path normalization
//! - **classpath**: Ordered, duplicate-free classpath container
//! - **probe**: Archive and directory probing for class files
//! - **catalog**: Class listings per classpath entry
//! - **classfile**: Class file header reader for the defining class name
//! - **resolver**: Ordered class lookup and classpath root inference
//! - **history**: Per-tab back/forward navigation history
//! - **recent**: Bounded most-recent-first workspace list
//! - **windows**: Window registry with cyclic next/previous
//! - **bounds**: Window placement defaults and on-screen sanitizing
//! - **session**: Workspace session model and its document format
//! - **store**: Workspace file save and background load
//! - **prefs**: Key/value preference storage backed by LMDB
//! - **browser**: Command dispatch over all of the above

pub mod bounds;
pub mod browser;
pub mod catalog;
pub mod classfile;
pub mod classpath;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod history;
pub mod prefs;
pub mod probe;
pub mod recent;
pub mod resolver;
pub mod session;
pub mod store;
pub mod windows;

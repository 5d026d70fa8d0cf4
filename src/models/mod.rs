// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor data model: boxes, their store, edit history and class selection.

pub mod classes;
pub mod history;
pub mod region;
pub mod session;
pub mod store;

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: backend sync and local document files.

pub mod backend;
pub mod serialization;
pub mod sync;
pub mod worker;

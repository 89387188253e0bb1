// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod backup;
pub mod cli;
pub mod commands;
pub mod currency;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod report;
pub mod utils;

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The stages of one refresh cycle.
//!
//! A cycle is a three stage pipeline: [`generator`] turns the ranked ID list
//! into a channel, [`workers`] resolve those IDs concurrently, and
//! [`aggregate`] folds the outcomes back into rank order. All stages share a
//! single [`stop`] signal that the aggregator raises once it has what it needs.

pub(crate) mod aggregate;
pub(crate) mod generator;
pub(crate) mod stop;
pub(crate) mod workers;

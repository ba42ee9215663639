#![doc = "glue-deploy-core: core logic library for glue-deploy."]

//! This crate contains the naming rules, the Glue job/trigger compiler and the
//! staging pipeline that uploads job artifacts before a deployment.
//! Real transports (S3, template files) live in the `glue-deploy` crate and
//! plug in through the traits in [`contract`].
//!
//! # Usage
//! Build a [`deploy::Deployer`] around a [`contract::BlobStore`], then call
//! [`deploy::Deployer::run`] with the resolved plugin configuration and a
//! [`contract::TemplateAccumulator`] such as [`template::TemplateSections`].

pub mod compile;
pub mod config;
pub mod contract;
pub mod deploy;
pub mod error;
pub mod expand;
pub mod naming;
pub mod template;

/*!
# Specs Catalog

A small internal tool that keeps a catalog of design documents ("specs") and
serves it to the browser, built in Rust.

## Overview

Every team keeps its specs as Google Docs in its own Drive folder. Each spec
opens with a two-column header table (Index, Title, Status, Authors, Type,
Created). A batch job walks the folder tree, reads that table from every
document and writes one row per spec into a tracking spreadsheet. A second
step exports the spreadsheet to a local JSON-lines file, which the web process
loads at startup.

## Architecture

### Batch Layer
- **Binary**: `specs-cli`
- **Commands**:
  - `update-spreadsheet` - Rebuilds a staging sheet from Drive, then swaps it
    live in a single batch update
  - `export-specs` - Saves the live sheet as `specs.json`

### Web Layer
- **Technologies**: Rust, axum, handlebars
- **Key Components**:
  - Listing - All specs grouped by team
  - My specs - Specs crediting the signed-in user
  - Short links - `/spec/<index>` redirects to the document
  - Detail endpoint - Header metadata plus rendered HTML, cached for a while
  - Google sign-in - OAuth2 with server-side sessions

### Core Library
- Header table extraction over a neutral cell model
- Author parsing and catalog-wide unification
- Drive, Docs and Sheets access behind two traits

## Modules

- **config**: Environment configuration
- **logger**: Log output setup
- **error**: Shared error type
- **document**: Google Docs document model
- **extractor**: Header table parsing
- **authors**: Author parsing and unification
- **spec**: Spec records and detail payloads
- **catalog**: Loaded catalog and its queries
- **google**: Drive, Docs and Sheets clients
- **sync**: Tracking sheet synchronization
- **export**: Tracking sheet export
- **cache**: Expiring LRU cache
- **session**: Google sign-in and sessions
- **app**: Routing and middleware

## HTTP Endpoints

- `/` - Listing grouped by team
- `/my-specs` - Listing filtered to the signed-in user
- `/spec/{code}` - Redirect to the document with that index
- `/spec-details/{id}` - `{metadata, url, html}` for one document
- `/_status/check` - Liveness probe
- `/auth/google/login`, `/auth/google/callback`, `/logout` - Sign-in flow
*/

pub mod authors;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod extractor;
pub mod google;
pub mod logger;
pub mod spec;
pub mod sync;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod cache;
#[cfg(feature = "web")]
pub mod session;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{Result, SpecsError};
pub use spec::{CatalogSpec, SpecDetails, SpecRecord};

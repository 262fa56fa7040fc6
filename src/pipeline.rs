//! The collaborator layer around the core: parse, build, render, serialize.
//!
//! Parsing and image rendering are process-level concerns this crate does
//! not own. Each is a narrow capability trait so the pipeline can run
//! against real bindings in production and substitutable fakes in tests.
//! The core between them never fails; every error here belongs to one of
//! the two capabilities.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::ast::Module;
use crate::cfg::visualize::to_dot;
use crate::cfg::{build_flowchart, FlowChart};

/// Turns source text into the tree the builder consumes.
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<Module, ParseError>;
}

/// Lays out DOT text into image bytes (e.g. by invoking Graphviz).
pub trait GraphRenderer {
    fn render(&self, dot: &str) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

#[derive(Debug, Error)]
#[error("render error: {message}")]
pub struct RenderError {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The serialized result: the rendered image plus both line maps, with node
/// ids in their `node_<N>` boundary form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOutput {
    pub image: String,
    pub line_to_node: BTreeMap<u32, String>,
    pub node_to_line: BTreeMap<String, Vec<u32>>,
}

impl FlowOutput {
    fn assemble(image: Vec<u8>, chart: &FlowChart) -> Self {
        let line_to_node = chart
            .lines
            .line_entries()
            .map(|(line, node)| (line, node.to_string()))
            .collect();
        let node_to_line = chart
            .lines
            .node_entries()
            .map(|(node, lines)| (node.to_string(), lines.to_vec()))
            .collect();
        Self {
            // Rendered bytes are decoded lossily: the image is display
            // content, not data the caller round-trips.
            image: String::from_utf8_lossy(&image).into_owned(),
            line_to_node,
            node_to_line,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Drives source text all the way to the serialized envelope.
pub struct Pipeline<P, R> {
    parser: P,
    renderer: R,
}

impl<P: SourceParser, R: GraphRenderer> Pipeline<P, R> {
    pub fn new(parser: P, renderer: R) -> Self {
        Self { parser, renderer }
    }

    pub fn run(&self, source: &str) -> Result<FlowOutput, PipelineError> {
        let module = self.parser.parse(source)?;
        let chart = build_flowchart(&module);
        tracing::debug!(
            nodes = chart.graph.num_nodes(),
            edges = chart.graph.edges().len(),
            "flowchart built"
        );
        let image = self.renderer.render(&to_dot(&chart.graph))?;
        Ok(FlowOutput::assemble(image, &chart))
    }
}

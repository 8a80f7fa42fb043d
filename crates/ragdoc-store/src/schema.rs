//! Collection schema for indexed records.

use serde::Serialize;

/// Body of a create-collection request.
#[derive(Serialize)]
pub(crate) struct CreateCollectionBody {
    mappings: Mappings,
}

#[derive(Serialize)]
struct Mappings {
    properties: Properties,
}

#[derive(Serialize)]
struct Properties {
    name: TextProperty,
    text: TextProperty,
    lemma: TextProperty,
    embed: VectorProperty,
}

#[derive(Serialize)]
struct TextProperty {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct VectorProperty {
    #[serde(rename = "type")]
    kind: &'static str,
    dims: usize,
    index: bool,
    similarity: &'static str,
}

impl CreateCollectionBody {
    /// Fixed record schema: three text fields plus a search-enabled dense
    /// vector of `dims` components under cosine similarity.
    pub(crate) fn new(dims: usize) -> Self {
        Self {
            mappings: Mappings {
                properties: Properties {
                    name: TextProperty { kind: "text" },
                    text: TextProperty { kind: "text" },
                    lemma: TextProperty { kind: "text" },
                    embed: VectorProperty {
                        kind: "dense_vector",
                        dims,
                        index: true,
                        similarity: "cosine",
                    },
                },
            },
        }
    }
}

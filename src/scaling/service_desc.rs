// Cloud Run (Knative serving.knative.dev/v1) Service 对象
// Only the fields the rescaler touches are typed; everything else rides along in `extra`
// so the PUT sends back what the GET returned.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const MIN_SCALE_ANNOTATION: &str = "autoscaling.knative.dev/minScale";
pub const MAX_SCALE_ANNOTATION: &str = "autoscaling.knative.dev/maxScale";
pub const LAUNCH_STAGE_ANNOTATION: &str = "run.googleapis.com/launch-stage";
/// Launch stage that unlocks minScale on the service template.
pub const LAUNCH_STAGE_BETA: &str = "BETA";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default)]
    pub template: RevisionTemplate,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDescription {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ServiceSpec,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceDescription {
    pub fn min_scale(&self) -> Option<&str> {
        self.template_annotation(MIN_SCALE_ANNOTATION)
    }

    pub fn max_scale(&self) -> Option<&str> {
        self.template_annotation(MAX_SCALE_ANNOTATION)
    }

    /// String comparison against the template annotations, the same form the
    /// provider stores them in. A missing annotation never matches.
    pub fn scale_matches(&self, min: &str, max: &str) -> bool {
        self.min_scale() == Some(min) && self.max_scale() == Some(max)
    }

    pub fn apply_scale(&mut self, min: &str, max: &str) {
        self.metadata
            .annotations
            .insert(LAUNCH_STAGE_ANNOTATION.to_string(), LAUNCH_STAGE_BETA.to_string());

        // 清空模板名，否则 PUT 会因 revision 重名被拒绝
        let template = &mut self.spec.template.metadata;
        template.name.clear();
        template
            .annotations
            .insert(MIN_SCALE_ANNOTATION.to_string(), min.to_string());
        template
            .annotations
            .insert(MAX_SCALE_ANNOTATION.to_string(), max.to_string());
    }

    fn template_annotation(&self, key: &str) -> Option<&str> {
        self.spec
            .template
            .metadata
            .annotations
            .get(key)
            .map(String::as_str)
    }
}

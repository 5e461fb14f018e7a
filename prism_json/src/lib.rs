use prism::*;
use std::error::Error;
// `prism` exports its own single-parameter `Result`
use std::result::Result;

use core::ops::Deref;

pub use serde_json;

use serde_json::{json, Value};

pub fn map_json_array<C: FromIterator<T>, T>(
    json: &Value,
    map: impl FnMut(&Value) -> Result<T, Box<dyn Error>>,
) -> Result<C, Box<dyn Error>> {
    json.as_array()
        .ok_or("json value must be an array")?
        .iter()
        .map(map)
        .collect()
}

/// Reads `key` with `parse`. A missing key, or an explicit `null`, reads as `None`.
pub fn get_optional<'a, T>(
    json: &'a Value,
    key: &str,
    parse: impl FnOnce(&'a Value) -> Option<T>,
) -> Result<Option<T>, Box<dyn Error>> {
    match json.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| format!("invalid value for \"{key}\": {value}").into()),
    }
}

pub fn get_float(json: &Value, key: &str) -> Result<Float, Box<dyn Error>> {
    get_optional(json, key, Value::as_f64)?.ok_or_else(|| format!("missing \"{key}\"").into())
}

fn point_to_json(point: &Point) -> Value {
    json!([point.x, point.y])
}

fn polyline_to_json(points: &[Point]) -> Value {
    Value::Array(points.iter().map(point_to_json).collect())
}

pub trait JsonSer {
    /// Serialize `self` into a JSON object.
    fn to_json(&self) -> Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> Value {
        Value::Array(Vec::from_iter(self.iter().map(T::to_json)))
    }
}

impl<const N: usize, T: JsonSer> JsonSer for [T; N] {
    fn to_json(&self) -> Value {
        self.as_slice().to_json()
    }
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all
// types implementing `Deref` makes the trait unusable downstream

impl<T: JsonSer + ?Sized> JsonSer for Box<T> {
    fn to_json(&self) -> Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer> JsonSer for Vec<T> {
    fn to_json(&self) -> Value {
        self.deref().to_json()
    }
}

impl<'a, T: JsonSer + ?Sized> JsonSer for &'a T {
    fn to_json(&self) -> Value {
        (*self).to_json()
    }
}

pub trait JsonDes {
    /// Deserialize from a JSON object.
    ///
    /// Returns an error if `json`'s format or values are invalid.
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;
}

impl<T: JsonDes> JsonDes for Vec<T> {
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        map_json_array(json, T::from_json)
    }
}

impl JsonSer for Prism {
    /// The format of the returned object is explained in [`Self::from_json`].
    ///
    /// `type` and `intensity_factor` are left out when they hold their default value.
    fn to_json(&self) -> Value {
        let mut json = json!({
            "id": self.id,
            "x": self.pos.x,
            "y": self.pos.y,
            "angle": self.angle,
        });

        if let Some(object) = json.as_object_mut() {
            if self.kind != PrismKind::Normal {
                object.insert("type".into(), self.kind.name().into());
            }
            if self.intensity_factor != 1.0 {
                object.insert("intensity_factor".into(), self.intensity_factor.into());
            }
        }

        json
    }
}

impl JsonDes for Prism {
    /// Deserialize a new prism from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "id": 3, // (an integer, unique among prisms)
    ///     "x": 10.0,
    ///     "y": 0.0,
    ///     "angle": 90.0, // (deflection in degrees)
    ///     "type": "splitter", // (optional, one of "normal", "splitter", "combiner", "reducer", "amplifier")
    ///     "intensity_factor": 0.5, // (optional, defaults to 1.0)
    /// }
    /// ```
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        let id = get_optional(json, "id", Value::as_i64)?.ok_or("Missing prism id")?;

        let kind = match get_optional(json, "type", Value::as_str)? {
            Some(name) => {
                PrismKind::from_name(name).ok_or_else(|| format!("invalid prism type: {name}"))?
            }
            None => PrismKind::Normal,
        };

        let intensity_factor = get_optional(json, "intensity_factor", Value::as_f64)?.unwrap_or(1.0);

        Ok(Self::new(
            id,
            [get_float(json, "x")?, get_float(json, "y")?],
            get_float(json, "angle")?,
        )
        .with_kind(kind)
        .with_intensity_factor(intensity_factor))
    }
}

impl JsonSer for LaserSource {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "x": self.pos.x,
            "y": self.pos.y,
            "angle": self.angle,
        })
    }
}

impl JsonDes for LaserSource {
    /// Deserialize a new laser source from a JSON object.
    ///
    /// ```json
    /// {
    ///     "id": 1,
    ///     "x": 0.0,
    ///     "y": 0.0,
    ///     "angle": 0.0, // (absolute heading in degrees)
    /// }
    /// ```
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        Ok(Self::new(
            get_optional(json, "id", Value::as_i64)?.ok_or("Missing laser source id")?,
            [get_float(json, "x")?, get_float(json, "y")?],
            get_float(json, "angle")?,
        ))
    }
}

impl JsonSer for TraceConfig {
    fn to_json(&self) -> Value {
        json!({
            "angle_tolerance": self.angle_tolerance,
            "max_iterations": self.max_iterations,
            "attenuation_factor": self.attenuation_factor,
            "attenuation_threshold": self.attenuation_threshold,
            "heading_precision": self.heading_precision,
            "escape_length": self.escape_length,
            "self_hit_epsilon": self.self_hit_epsilon,
            "tie_break": self.tie_break.name(),
        })
    }
}

impl JsonDes for TraceConfig {
    /// Every key is optional, missing ones keep their [`Default`] value.
    ///
    /// The result isn't validated, see [`TraceConfig::validate`].
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        let mut config = Self::default();

        if let Some(tolerance) = get_optional(json, "angle_tolerance", Value::as_f64)? {
            config.angle_tolerance = tolerance;
        }
        if let Some(max) = get_optional(json, "max_iterations", Value::as_u64)? {
            config.max_iterations = max.try_into()?;
        }
        if let Some(factor) = get_optional(json, "attenuation_factor", Value::as_f64)? {
            config.attenuation_factor = factor;
        }
        if let Some(threshold) = get_optional(json, "attenuation_threshold", Value::as_f64)? {
            config.attenuation_threshold = threshold;
        }
        if let Some(decimals) = get_optional(json, "heading_precision", Value::as_u64)? {
            config.heading_precision = decimals.try_into()?;
        }
        if let Some(length) = get_optional(json, "escape_length", Value::as_f64)? {
            config.escape_length = length;
        }
        if let Some(epsilon) = get_optional(json, "self_hit_epsilon", Value::as_f64)? {
            config.self_hit_epsilon = epsilon;
        }
        if let Some(name) = get_optional(json, "tie_break", Value::as_str)? {
            config.tie_break =
                TieBreak::from_name(name).ok_or_else(|| format!("invalid tie break rule: {name}"))?;
        }

        Ok(config)
    }
}

impl JsonSer for Scene {
    /// The scene file layout: prisms, sources, and the config keys at the top level.
    fn to_json(&self) -> Value {
        let mut json = self.config.to_json();

        if let Some(object) = json.as_object_mut() {
            object.insert("prisms".into(), self.prisms.to_json());
            object.insert("start_configs".into(), self.sources.to_json());
        }

        json
    }
}

impl JsonDes for Scene {
    /// Deserialize a scene from a scene file:
    ///
    /// ```json
    /// {
    ///     "prisms": [...], // (optional, see `Prism::from_json`)
    ///     "start_configs": [...], // (optional, see `LaserSource::from_json`)
    ///     "start_cfg": { "x": 0.0, "y": 0.0, "angle": 0.0 }, // (legacy, optional)
    ///     "angle_tolerance": 0.01, // (optional, as are all the config keys)
    ///     "max_iterations": 1000,
    /// }
    /// ```
    ///
    /// A legacy `start_cfg` takes precedence over `start_configs` and becomes source `1`
    /// (unless it carries an id). With neither, there is one source at the origin,
    /// heading east.
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        let prisms = match json.get("prisms") {
            Some(prisms) => Vec::<Prism>::from_json(prisms)?,
            None => Vec::new(),
        };

        let sources = if let Some(legacy) = json.get("start_cfg") {
            let mut legacy = legacy.clone();
            let object = legacy.as_object_mut().ok_or("start_cfg must be an object")?;
            object.entry("id").or_insert(1.into());
            vec![LaserSource::from_json(&legacy)?]
        } else if let Some(sources) = json.get("start_configs") {
            Vec::<LaserSource>::from_json(sources)?
        } else {
            vec![LaserSource::new(1, [0., 0.], 0.)]
        };

        Ok(Self::new(prisms, sources, TraceConfig::from_json(json)?))
    }
}

impl JsonSer for Segment {
    fn to_json(&self) -> Value {
        json!({
            "start": point_to_json(&self.start),
            "end": point_to_json(&self.end),
            "start_intensity": self.start_intensity,
            "end_intensity": self.end_intensity,
        })
    }
}

impl JsonSer for PathResult {
    /// ```json
    /// {
    ///     "source": 1,
    ///     "sequence": [3, 1, 2],
    ///     "segments": [{ "start": [0.0, 0.0], "end": [10.0, 0.0], "start_intensity": 1.0, "end_intensity": 1.0 }],
    ///     "cones": [{ "apex": [0.0, 0.0], "upper": [10.0, 0.0017], "lower": [10.0, -0.0017] }],
    ///     "loop": [[10.0, 0.0], [0.0, 0.0], [10.0, 0.0]], // (or null)
    ///     "error": "...", // (or null)
    /// }
    /// ```
    fn to_json(&self) -> Value {
        json!({
            "source": self.source,
            "sequence": self.sequence,
            "segments": self.segments.to_json(),
            "cones": self.cones.to_json(),
            "loop": self.loop_tail.as_deref().map(polyline_to_json),
            "error": self.error.map(|e| e.to_string()),
        })
    }
}

impl JsonSer for ToleranceCone {
    fn to_json(&self) -> Value {
        json!({
            "apex": point_to_json(&self.apex),
            "upper": point_to_json(&self.upper),
            "lower": point_to_json(&self.lower),
        })
    }
}

impl JsonSer for TracePath {
    fn to_json(&self) -> Value {
        json!({
            "source": self.source,
            "sequence": self.sequence,
            "path": polyline_to_json(&self.path),
            "cones": self.cones.to_json(),
            "loop": self.loop_tail.as_deref().map(polyline_to_json),
            "error": self.error.map(|e| e.to_string()),
        })
    }
}

pub fn serialize_scene(scene: &Scene) -> Value {
    scene.to_json()
}

pub fn deserialize_scene(json: &Value) -> Result<Scene, Box<dyn Error>> {
    Scene::from_json(json)
}

/// Serializes a scene's trace results, next to the config they were computed with.
pub fn serialize_results(config: &TraceConfig, results: &[impl JsonSer]) -> Value {
    json!({
        "config": config.to_json(),
        "results": results.to_json(),
    })
}

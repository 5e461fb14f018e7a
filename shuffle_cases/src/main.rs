use std::{error::Error, fs::File};

use clap::Parser;
use log::{debug, info};
use prism::PrismId;
use prism_random::{
    rand::{self, rngs::StdRng, SeedableRng},
    remap_sequence, shuffle_ids_with,
};
use serde_json::{Map, Value};

mod cli;

use cli::Args;
use prism_cli::init_logger;

/// Shuffles the prisms of one case in place, and rewrites its expected sequence to match.
///
/// Prisms are moved around as they are, only their `"id"` changes. Cases without
/// prisms are left untouched.
fn shuffle_case(
    case: &mut Value,
    rng: &mut (impl rand::Rng + ?Sized),
) -> Result<(), Box<dyn Error>> {
    let Some(prisms_json) = case.pointer_mut("/input/prisms") else {
        return Ok(());
    };

    let mut prisms = prisms_json
        .as_array_mut()
        .ok_or("prisms must be an array")?
        .drain(..)
        .map(|prism| match prism {
            Value::Object(object) => match object.get("id").and_then(Value::as_i64) {
                Some(id) => Ok((id, object)),
                None => Err(format!("prism without an integer id: {}", Value::Object(object))),
            },
            other => Err(format!("prisms must be objects, got {other}")),
        })
        .collect::<Result<Vec<(PrismId, Map<String, Value>)>, _>>()?;

    if prisms.is_empty() {
        return Ok(());
    }

    let ids = shuffle_ids_with(
        &mut prisms,
        rng,
        |&(id, _)| id,
        |(id, object), new| {
            *id = new;
            object.insert("id".into(), new.into());
        },
    );
    *prisms_json = prisms.into_iter().map(|(_, object)| Value::Object(object)).collect();

    if let Some(sequence_json) = case.pointer_mut("/expected/sequence") {
        let mut sequence = prism_json::map_json_array::<Vec<_>, _>(sequence_json, |id| {
            id.as_i64()
                .ok_or_else(|| "sequence ids must be integers".into())
        })?;
        remap_sequence(&mut sequence, &ids);
        *sequence_json = sequence.into();
    }

    Ok(())
}

fn shuffle_cases(
    data: &mut Value,
    rng: &mut (impl rand::Rng + ?Sized),
) -> Result<usize, Box<dyn Error>> {
    let Some(cases) = data.get_mut("cases") else {
        return Ok(0);
    };

    let cases = cases.as_array_mut().ok_or("cases must be an array")?;

    for (i, case) in cases.iter_mut().enumerate() {
        debug!("shuffling case {i}");
        shuffle_case(case, rng)?;
    }

    Ok(cases.len())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_logger(args.log_level.into());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut data: Value = serde_json::from_reader(File::open(&args.input)?)?;

    let count = shuffle_cases(&mut data, &mut rng)?;

    serde_json::to_writer_pretty(File::create(&args.output)?, &data)?;

    info!("shuffled {count} case(s) into {}", args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism::{trace_one, LaserSource, Prism, TraceConfig};
    use prism_json::JsonDes;
    use serde_json::json;

    fn case() -> Value {
        json!({
            "description": "three turns",
            "input": {
                "start": {"x": 0, "y": 0, "angle": 0},
                "prisms": [
                    {"id": 1, "x": 10, "y": 0, "angle": 90},
                    {"id": 2, "x": 10, "y": 10, "angle": 90},
                    {"id": 3, "x": 0, "y": 10, "angle": -45},
                    {"id": 4, "x": -5, "y": -5, "angle": 0}
                ]
            },
            "expected": {"sequence": [1, 2, 3]}
        })
    }

    #[test]
    fn expected_sequences_follow_the_new_ids() {
        let mut data = json!({"exercise": "prism", "cases": [case(), {"input": {}}]});

        let count = shuffle_cases(&mut data, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(data["exercise"], "prism");

        let case = &data["cases"][0];
        assert_eq!(case["description"], "three turns");
        assert_eq!(case["input"]["start"], json!({"x": 0, "y": 0, "angle": 0}));

        let prisms = Vec::<Prism>::from_json(&case["input"]["prisms"]).unwrap();
        let expected = Vec::<i64>::from_iter(
            case["expected"]["sequence"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(Value::as_i64),
        );

        let path = trace_one(
            &LaserSource::new(1, [0., 0.], 0.),
            &prisms,
            &TraceConfig::default(),
        );
        assert_eq!(path.sequence, expected);

        assert_eq!(data["cases"][1], json!({"input": {}}));
    }

    #[test]
    fn files_without_cases_are_fine() {
        let mut data = json!({"exercise": "prism"});
        assert_eq!(shuffle_cases(&mut data, &mut StdRng::seed_from_u64(0)).unwrap(), 0);
    }

    #[test]
    fn prisms_are_only_renumbered() {
        let prisms = json!([
            {"id": 1, "x": 10, "y": 0, "angle": 90, "note": "keep me"},
            {"id": 2, "x": 10, "y": 10},
            {"id": 3, "type": "splitter", "x": 0.5, "y": 10, "angle": -45}
        ]);
        let mut data = json!({"cases": [{
            "input": {"prisms": prisms.clone()},
            "expected": {"sequence": [1, 2]}
        }]});

        shuffle_cases(&mut data, &mut StdRng::seed_from_u64(5)).unwrap();

        let case = &data["cases"][0];
        let sequence = &case["expected"]["sequence"];
        let shuffled = case["input"]["prisms"].as_array().unwrap();

        let without_id = |prism: &Value| {
            let mut prism = prism.clone();
            prism["id"] = Value::Null;
            prism.to_string()
        };
        let mut before: Vec<_> = prisms.as_array().unwrap().iter().map(without_id).collect();
        let mut after: Vec<_> = shuffled.iter().map(without_id).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        let noted = shuffled.iter().find(|p| p.get("note").is_some()).unwrap();
        assert_eq!(
            *noted,
            json!({"id": sequence[0], "x": 10, "y": 0, "angle": 90, "note": "keep me"})
        );
        let angleless = shuffled.iter().find(|p| p.get("angle").is_none()).unwrap();
        assert_eq!(angleless["id"], sequence[1]);
    }

    #[test]
    fn prisms_need_integer_ids() {
        let mut data = json!({"cases": [{"input": {"prisms": [{"id": "a", "x": 0, "y": 0}]}}]});
        assert!(shuffle_cases(&mut data, &mut StdRng::seed_from_u64(0)).is_err());
    }
}

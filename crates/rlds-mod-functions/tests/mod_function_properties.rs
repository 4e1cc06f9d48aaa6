//! Behavioural properties every built-in mod function must satisfy.

use ndarray::{ArrayD, IxDyn};
use proptest::prelude::*;
use rlds_mod_functions::{mod_obs_features, FilterSuccess, FlipImageChannels, ModFunction, ResizeAndJpegEncode};
use rlds_structures::conformance::check_episode;
use rlds_structures::{
    DType, Dataset, Episode, Feature, FeatureDescriptor, FeaturesDict, ImageEncoding, Record, RldsDataError, Shape,
    Step, Tensor, OBSERVATION_KEY, STEPS_KEY, SUCCESS_KEY,
};
use std::sync::Arc;

//region Fixtures

fn schema(observation: FeaturesDict) -> FeaturesDict {
    let steps = FeaturesDict::from_entries([
        ("action", Feature::from(FeatureDescriptor::tensor(Shape::fixed(&[7]), DType::F32, None))),
        (OBSERVATION_KEY, Feature::Dict(observation)),
        ("reward", Feature::from(FeatureDescriptor::tensor(Shape::scalar(), DType::F32, None))),
    ]);
    FeaturesDict::from_entries([
        (SUCCESS_KEY, Feature::from(FeatureDescriptor::tensor(Shape::scalar(), DType::Bool, None))),
        (STEPS_KEY, Feature::Sequence(steps)),
    ])
}

fn image_feature(dims: &[usize], dtype: DType, encoding: ImageEncoding) -> Feature {
    Feature::from(FeatureDescriptor::image(Shape::fixed(dims), dtype, encoding, Some("camera".to_string())))
}

fn gradient_u8(dims: &[usize]) -> Tensor {
    let len: usize = dims.iter().product();
    ArrayD::from_shape_vec(IxDyn(dims), (0..len).map(|i| (i % 251) as u8).collect())
        .unwrap()
        .into()
}

fn step(observation: Vec<(&str, Tensor)>) -> Step {
    let mut obs = Record::new();
    for (key, value) in observation {
        obs.insert(key.to_string(), value.into());
    }
    let mut fields = Record::new();
    fields.insert("action".to_string(), Tensor::zeros(DType::F32, &[7]).into());
    fields.insert(OBSERVATION_KEY.to_string(), obs.into());
    fields.insert("reward".to_string(), Tensor::zeros(DType::F32, &[]).into());
    Step::new(fields)
}

fn episode(success: bool, steps: Vec<Step>) -> Episode {
    let mut metadata = Record::new();
    metadata.insert(SUCCESS_KEY.to_string(), Tensor::scalar_bool(success).into());
    Episode::new(metadata, steps)
}

fn observation_tensor<'e>(episode: &'e Episode, step: usize, key: &str) -> &'e Tensor {
    episode.steps[step].observation().unwrap()[key].as_tensor().unwrap()
}

//endregion

#[test]
fn resized_values_match_resized_schema() {
    let observation = FeaturesDict::from_entries([
        ("image", image_feature(&[120, 100, 3], DType::U8, ImageEncoding::Png)),
        ("depth", image_feature(&[96, 128], DType::U16, ImageEncoding::Png)),
        ("state", Feature::from(FeatureDescriptor::tensor(Shape::fixed(&[8]), DType::F32, None))),
    ]);
    let features = schema(observation);
    let depth: Tensor = ArrayD::from_shape_fn(IxDyn(&[96, 128]), |index| (index[0] * 100 + index[1]) as u16).into();
    let steps = vec![
        step(vec![("image", gradient_u8(&[120, 100, 3])), ("depth", depth), ("state", Tensor::zeros(DType::F32, &[8]))]),
    ];
    let input = episode(true, steps);
    check_episode(&features, &input).unwrap();

    let new_features = ResizeAndJpegEncode.mod_features(&features).unwrap();
    let output = ResizeAndJpegEncode
        .mod_dataset(Dataset::from_episodes(vec![input]))
        .collect_episodes()
        .unwrap();

    check_episode(&new_features, &output[0]).unwrap();
    assert_eq!(observation_tensor(&output[0], 0, "image").shape(), &[256, 256, 3]);
    assert_eq!(observation_tensor(&output[0], 0, "image").dtype(), DType::U8);
    assert_eq!(observation_tensor(&output[0], 0, "depth").shape(), &[256, 256]);
    assert_eq!(observation_tensor(&output[0], 0, "depth").dtype(), DType::U16);
    assert_eq!(observation_tensor(&output[0], 0, "state").shape(), &[8]);
}

#[test]
fn depth_images_become_png_and_colour_images_jpeg() {
    let observation = FeaturesDict::from_entries([
        ("image", image_feature(&[480, 640, 3], DType::U8, ImageEncoding::Png)),
        ("depth_image", image_feature(&[480, 640, 1], DType::U16, ImageEncoding::Png)),
        ("point_cloud", Feature::from(FeatureDescriptor::tensor(Shape::fixed(&[128, 128, 3]), DType::F32, None))),
    ]);
    let new_features = ResizeAndJpegEncode.mod_features(&schema(observation)).unwrap();
    let new_observation = new_features.observation().unwrap();

    let image = new_observation.get("image").unwrap().as_leaf().unwrap();
    assert_eq!(image.encoding(), Some(ImageEncoding::Jpeg));
    assert_eq!(image.shape, Shape::fixed(&[256, 256, 3]));
    assert_eq!(image.doc.as_deref(), Some("camera"));

    let depth = new_observation.get("depth_image").unwrap().as_leaf().unwrap();
    assert_eq!(depth.encoding(), Some(ImageEncoding::Png));
    assert_eq!(depth.dtype, DType::U16);
    assert_eq!(depth.shape, Shape::fixed(&[256, 256, 1]));

    let cloud = new_observation.get("point_cloud").unwrap().as_leaf().unwrap();
    assert!(!cloud.is_image());
    assert_eq!(cloud.shape, Shape::fixed(&[256, 256, 3]));
}

#[test]
fn small_observations_and_other_keys_pass_through() {
    let observation = FeaturesDict::from_entries([
        ("joint_history", Feature::from(FeatureDescriptor::tensor(Shape::fixed(&[480, 7]), DType::F32, None))),
        ("image", image_feature(&[256, 256, 3], DType::U8, ImageEncoding::Jpeg)),
    ]);
    let features = schema(observation);
    let new_features = ResizeAndJpegEncode.mod_features(&features).unwrap();

    let before = features.observation().unwrap();
    let after = new_features.observation().unwrap();
    assert!(Arc::ptr_eq(before.get("joint_history").unwrap(), after.get("joint_history").unwrap()));
    assert!(Arc::ptr_eq(features.get(SUCCESS_KEY).unwrap(), new_features.get(SUCCESS_KEY).unwrap()));
    assert!(Arc::ptr_eq(
        features.steps().unwrap().get("action").unwrap(),
        new_features.steps().unwrap().get("action").unwrap()
    ));

    let output = ResizeAndJpegEncode
        .mod_dataset(Dataset::from_episodes(vec![episode(
            true,
            vec![step(vec![("joint_history", Tensor::zeros(DType::F32, &[480, 7]))])],
        )]))
        .collect_episodes()
        .unwrap();
    assert_eq!(observation_tensor(&output[0], 0, "joint_history").shape(), &[480, 7]);
}

#[test]
fn filter_keeps_successful_episodes_unchanged_and_in_order() {
    let episodes: Vec<Episode> = [true, false, true, false, false, true]
        .iter()
        .enumerate()
        .map(|(i, success)| episode(*success, vec![step(vec![("image", gradient_u8(&[2, 2, 3 + i]))])]))
        .collect();
    let expected: Vec<Episode> = episodes.iter().filter(|e| e.success().unwrap()).cloned().collect();

    let kept = FilterSuccess
        .mod_dataset(Dataset::from_episodes(episodes))
        .collect_episodes()
        .unwrap();
    assert_eq!(kept.len(), 3);
    assert_eq!(kept, expected);
}

#[test]
fn flipping_twice_restores_the_image() {
    let input = episode(true, vec![step(vec![("image", gradient_u8(&[4, 5, 3]))])]);
    let flip = FlipImageChannels::image();

    let once = flip.mod_dataset(Dataset::from_episodes(vec![input.clone()])).collect_episodes().unwrap();
    assert_ne!(once[0], input);
    let twice = flip.mod_dataset(Dataset::from_episodes(once)).collect_episodes().unwrap();
    assert_eq!(twice[0], input);
}

#[test]
fn wrist_flip_leaves_main_image_untouched() {
    let image = gradient_u8(&[3, 3, 3]);
    let input = episode(
        true,
        vec![step(vec![
            ("image", image.clone()),
            ("wrist_image", gradient_u8(&[3, 3, 3])),
            ("hand_image", gradient_u8(&[3, 3, 3])),
        ])],
    );
    let output = FlipImageChannels::wrist_image()
        .mod_dataset(Dataset::from_episodes(vec![input]))
        .collect_episodes()
        .unwrap();

    assert_eq!(observation_tensor(&output[0], 0, "image"), &image);
    let flipped = image.reverse_last_axis("wrist_image").unwrap();
    assert_eq!(observation_tensor(&output[0], 0, "wrist_image"), &flipped);
    assert_eq!(observation_tensor(&output[0], 0, "hand_image"), &flipped);
}

#[test]
fn flip_without_image_key_is_a_no_op() {
    let input = episode(true, vec![step(vec![("state", Tensor::zeros(DType::F32, &[8]))])]);
    let output = FlipImageChannels::image()
        .mod_dataset(Dataset::from_episodes(vec![input.clone()]))
        .collect_episodes()
        .unwrap();
    assert_eq!(output, vec![input]);
}

//region Properties

fn arb_observation() -> impl Strategy<Value = FeaturesDict> {
    prop::collection::vec(("[a-z_]{1,12}", prop::collection::vec(1usize..300, 0..4)), 0..8).prop_map(|entries| {
        FeaturesDict::from_entries(entries.into_iter().map(|(key, dims)| {
            (key, Feature::from(FeatureDescriptor::tensor(Shape::fixed(&dims), DType::U8, None)))
        }))
    })
}

fn arb_declared_dim() -> impl Strategy<Value = Option<usize>> {
    prop_oneof![Just(None), (1usize..160).prop_map(Some)]
}

/// A declared image shape with possibly variable leading axes, and a runtime shape conforming to it.
fn arb_variable_image() -> impl Strategy<Value = (Shape, Vec<usize>)> {
    (arb_declared_dim(), arb_declared_dim(), 1usize..160, 1usize..160, prop::option::of(1usize..4)).prop_map(
        |(height, width, runtime_height, runtime_width, channels)| {
            let mut declared = vec![height, width];
            let mut runtime = vec![height.unwrap_or(runtime_height), width.unwrap_or(runtime_width)];
            if let Some(channels) = channels {
                declared.push(Some(channels));
                runtime.push(channels);
            }
            (Shape::new(declared), runtime)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn resized_values_conform_or_schema_is_rejected((declared, runtime) in arb_variable_image()) {
        let observation = FeaturesDict::from_entries([(
            "image",
            Feature::from(FeatureDescriptor::image(declared.clone(), DType::U8, ImageEncoding::Png, None)),
        )]);
        let features = schema(observation);
        let input = episode(true, vec![step(vec![("image", gradient_u8(&runtime))])]);
        check_episode(&features, &input).unwrap();

        match ResizeAndJpegEncode.mod_features(&features) {
            Ok(new_features) => {
                let output = ResizeAndJpegEncode
                    .mod_dataset(Dataset::from_episodes(vec![input]))
                    .collect_episodes()
                    .unwrap();
                prop_assert!(check_episode(&new_features, &output[0]).is_ok());
            }
            Err(error) => {
                prop_assert!(ResizeAndJpegEncode::undecided_declared(&declared));
                prop_assert!(matches!(error, RldsDataError::UnsupportedValue { .. }), "unexpected error: {:?}", error);
            }
        }
    }
}

proptest! {
    #[test]
    fn observation_rewrite_preserves_key_order(observation in arb_observation()) {
        let features = schema(observation.clone());
        let rewritten = mod_obs_features(&features, |_, _| {
            Ok(Arc::new(Feature::from(FeatureDescriptor::tensor(Shape::scalar(), DType::F64, None))))
        })
        .unwrap();

        let before: Vec<&String> = observation.keys().collect();
        let after: Vec<&String> = rewritten.observation().unwrap().keys().collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn schema_preserving_mod_functions_are_identities(observation in arb_observation()) {
        let features = schema(observation);
        prop_assert_eq!(&FilterSuccess.mod_features(&features).unwrap(), &features);
        prop_assert_eq!(&FlipImageChannels::image().mod_features(&features).unwrap(), &features);
        prop_assert_eq!(&FlipImageChannels::wrist_image().mod_features(&features).unwrap(), &features);
    }

    #[test]
    fn resize_only_touches_qualifying_entries(observation in arb_observation()) {
        let features = schema(observation.clone());
        let rewritten = ResizeAndJpegEncode.mod_features(&features).unwrap();
        let new_observation = rewritten.observation().unwrap();
        prop_assert_eq!(new_observation.len(), observation.len());
        for (key, feature) in observation.iter() {
            let descriptor = feature.as_leaf().unwrap();
            let new_descriptor = new_observation.get(key).unwrap().as_leaf().unwrap();
            if ResizeAndJpegEncode::qualifies_declared(&descriptor.shape) {
                prop_assert_eq!(new_descriptor.shape.dim(0), Some(ResizeAndJpegEncode::MAX_RES));
                prop_assert_eq!(new_descriptor.shape.dim(1), Some(ResizeAndJpegEncode::MAX_RES));
                prop_assert_eq!(&new_descriptor.shape.dims()[2..], &descriptor.shape.dims()[2..]);
            } else {
                prop_assert_eq!(new_descriptor, descriptor);
            }
            prop_assert_eq!(new_descriptor.dtype, descriptor.dtype);
        }
    }
}

//endregion

use houghmatch::{encode_orientations, vote, BorderPolicy, ImageView, LookupTable, MatcherConfig, VoteParams};

fn make_template(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let in_box = (4..width - 6).contains(&x) && (3..height - 3).contains(&y);
            let dx = x as i64 - (width as i64 - 6);
            let dy = y as i64 - 5;
            let in_disk = dx * dx + dy * dy <= 9;
            data.push(if in_box || in_disk { 30 } else { 220 });
        }
    }
    data
}

fn config() -> MatcherConfig {
    MatcherConfig {
        sobel_kernel_size: 3,
        quantization_steps: 16,
        ..MatcherConfig::default()
    }
}

#[test]
fn table_is_dense_and_weights_sum_to_features() {
    let (width, height) = (31, 22);
    let data = make_template(width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let codes = encode_orientations(view, &config().encode_params()).unwrap();
    let table = LookupTable::build(&codes, 1.0);

    assert_eq!(table.num_codes(), usize::from(codes.max_code()) + 1);
    assert_eq!(table.max_code(), 17);
    assert_eq!(table.img_size(), (width, height));

    let total: u64 = table
        .iter()
        .flat_map(|(_, votes)| votes.iter().map(|v| u64::from(v.weight)))
        .sum();
    assert_eq!(total, table.max_votes());
    assert_eq!(total, codes.feature_count() as u64);
    assert!(table.votes_for(0).is_empty());
    assert!(table.votes_for(table.max_code()).is_empty());
}

#[test]
fn unscaled_entries_are_unit_weight_and_unique() {
    let (width, height) = (31, 22);
    let data = make_template(width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let codes = encode_orientations(view, &config().encode_params()).unwrap();
    let table = LookupTable::build(&codes, 1.0);

    for (_, votes) in table.iter() {
        assert!(votes.iter().all(|v| v.weight == 1));
        for pair in votes.windows(2) {
            assert!((pair[0].dy, pair[0].dx) < (pair[1].dy, pair[1].dx));
        }
    }
    let reach = table.reach();
    assert!(reach.left <= width / 2 && reach.right <= width / 2);
    assert!(reach.up <= height / 2 && reach.down <= height / 2);
}

#[test]
fn downscaling_merges_votes_without_losing_weight() {
    let (width, height) = (31, 22);
    let data = make_template(width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let codes = encode_orientations(view, &config().encode_params()).unwrap();
    let full = LookupTable::build(&codes, 1.0);
    let half = LookupTable::build(&codes, 0.5);

    assert_eq!(half.max_votes(), full.max_votes());
    assert!(half.total_entries() < full.total_entries());
    assert!(half.reach().right <= full.reach().right / 2 + 1);
}

#[test]
fn rebuilding_is_idempotent() {
    let (width, height) = (31, 22);
    let data = make_template(width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let params = config().encode_params();

    let first = LookupTable::build(&encode_orientations(view, &params).unwrap(), 1.3);
    let second = LookupTable::build(&encode_orientations(view, &params).unwrap(), 1.3);
    assert_eq!(first, second);

    let scene_w = 90;
    let scene_h = 70;
    let mut scene = vec![220u8; scene_w * scene_h];
    for y in 0..height {
        for x in 0..width {
            scene[(y + 20) * scene_w + x + 30] = data[y * width + x];
        }
    }
    let scene_view = ImageView::from_slice(&scene, scene_w, scene_h).unwrap();
    let scene_codes = encode_orientations(scene_view, &params).unwrap();
    for policy in [BorderPolicy::Strict, BorderPolicy::AllPixel] {
        let vote_params = VoteParams { stride: 1, policy };
        let a = vote::<u32>(&scene_codes, &first, vote_params).unwrap();
        let b = vote::<u32>(&scene_codes, &second, vote_params).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn degenerate_templates_build_empty_tables() {
    let params = config().encode_params();

    let flat = vec![77u8; 16 * 12];
    let view = ImageView::from_slice(&flat, 16, 12).unwrap();
    let table = LookupTable::build(&encode_orientations(view, &params).unwrap(), 1.0);
    assert!(table.is_empty());
    assert_eq!(table.num_codes(), 18);
    assert_eq!(table.max_votes(), 0);
    assert!(table.iter().all(|(_, votes)| votes.is_empty()));

    let empty = ImageView::<u8>::from_slice(&[], 0, 0).unwrap();
    let table = LookupTable::build(&encode_orientations(empty, &params).unwrap(), 2.0);
    assert!(table.is_empty());
    assert_eq!(table.img_size(), (0, 0));
    assert_eq!(table.num_codes(), 18);
}

#![cfg(feature = "rayon")]

use houghmatch::lowlevel::vote_par;
use houghmatch::{
    encode_orientations, vote, BorderPolicy, ImageView, LookupTable, Matcher, MatcherConfig,
    VoteParams,
};

fn make_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

#[test]
fn parallel_votes_match_sequential() {
    let (sw, sh) = (140, 110);
    let scene = make_image(sw, sh);
    let scene_view = ImageView::from_slice(&scene, sw, sh).unwrap();
    let template_view = scene_view.roi(40, 30, 32, 24).unwrap();

    let params = MatcherConfig::default().encode_params();
    let table = LookupTable::build(&encode_orientations(template_view, &params).unwrap(), 1.0);
    let codes = encode_orientations(scene_view, &params).unwrap();

    for policy in [BorderPolicy::Strict, BorderPolicy::AllPixel] {
        for stride in [1usize, 2, 4] {
            let vote_params = VoteParams { stride, policy };
            let seq = vote::<u32>(&codes, &table, vote_params).unwrap();
            let par = vote_par::<u32>(&codes, &table, vote_params).unwrap();
            assert_eq!(seq, par, "{policy:?} stride {stride}");
        }
    }
}

#[test]
fn parallel_matcher_matches_sequential() {
    let (sw, sh) = (140, 110);
    let scene = make_image(sw, sh);
    let scene_view = ImageView::from_slice(&scene, sw, sh).unwrap();
    let template_view = scene_view.roi(50, 40, 30, 30).unwrap();

    let seq = Matcher::new(template_view, MatcherConfig::default()).unwrap();
    let par = Matcher::new(
        template_view,
        MatcherConfig {
            parallel: true,
            ..MatcherConfig::default()
        },
    )
    .unwrap();

    let a = seq.match_image(scene_view).unwrap().unwrap();
    let b = par.match_image(scene_view).unwrap().unwrap();
    assert_eq!(a, b);
}

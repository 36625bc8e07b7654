//! Every asset kind emits one well-formed equation per unknown.

use hn_components::{
    Asset, AssetKind, Buffer, HeatBoundary, HeatTransfer, HeatTransferKind, NodeLink, Pipe,
    PressureBoundary,
};
use hn_core::units::{degc, k, m, pa, w};
use hn_core::{NodeId, UnknownBlock};
use hn_fluids::{FluidProperties, WaterTable};
use proptest::prelude::*;

fn wired(kind: AssetKind, previous: &[f64]) -> Asset {
    let mut asset = Asset::new("a", kind);
    let cps = asset.connection_count();
    // nodes occupy the first 3·cps unknowns, the asset follows
    for cp in 0..cps {
        asset
            .connect(
                cp,
                NodeLink {
                    node: NodeId::from_index(cp as u32),
                    block: UnknownBlock::new(3 * cp, 3),
                },
            )
            .unwrap();
    }
    asset
        .assign_block(UnknownBlock::new(3 * cps, asset.unknown_count()))
        .unwrap();
    asset
        .set_previous_solution(&previous[..asset.unknown_count()])
        .unwrap();
    asset
}

fn kinds() -> Vec<AssetKind> {
    vec![
        AssetKind::PressureBoundary(PressureBoundary::with_pressure(pa(1.5e5), k(293.15))),
        AssetKind::HeatBoundary(HeatBoundary::producer(degc(45.0), degc(85.0))),
        AssetKind::Pipe(
            Pipe::new(m(250.0), m(0.15))
                .with_zeta(2.0)
                .with_heat_loss(degc(8.0), 0.8),
        ),
        AssetKind::Buffer(Buffer::new(50.0, w(2.0e6), degc(45.0), degc(85.0))),
        AssetKind::HeatTransfer(HeatTransfer::new(
            HeatTransferKind::HeatPump { cop: 3.5 },
            (degc(25.0), degc(15.0)),
            (degc(45.0), degc(75.0)),
        )),
    ]
}

#[test]
fn every_kind_is_square() {
    let water = WaterTable::new();
    let u = water.internal_energy(333.15).unwrap();
    let previous: Vec<f64> = (0..12)
        .map(|i| match i % 3 {
            0 => if i % 2 == 0 { 1.5 } else { -1.5 },
            1 => 1.0e5,
            _ => u,
        })
        .collect();
    for kind in kinds() {
        let asset = wired(kind, &previous);
        let eqs = asset.equations(&water).unwrap();
        assert_eq!(eqs.len(), asset.unknown_count(), "{}", asset.kind().label());
        let unknowns = 2 * asset.unknown_count();
        for eq in &eqs {
            eq.check(unknowns).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn equations_stay_finite_for_any_previous_iterate(
        previous in prop::collection::vec(-50.0_f64..50.0, 12),
        temperature in 280.0_f64..400.0,
    ) {
        let water = WaterTable::new();
        let u = water.internal_energy(temperature).unwrap();
        // keep internal energies physical, flows and pressures arbitrary
        let previous: Vec<f64> = previous
            .iter()
            .enumerate()
            .map(|(i, v)| if i % 3 == 2 { u + v } else { *v })
            .collect();
        for kind in kinds() {
            let asset = wired(kind, &previous);
            match asset.equations(&water) {
                Ok(eqs) => {
                    for eq in &eqs {
                        prop_assert!(eq.check(2 * asset.unknown_count()).is_ok());
                    }
                }
                // coinciding primary temperatures are reported, never NaN
                Err(e) => prop_assert!(e.to_string().contains("coincide"), "{e}"),
            }
        }
    }
}

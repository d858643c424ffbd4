//! Motor de precios de ítems compuestos
//!
//! Cálculo puro: recibe el ítem, su categoría y los recursos ya resueltos.
//! La resolución (y sus errores de "no encontrado") queda en
//! `CompositeItemService`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::pricing_dto::{
    ComponentResource, CostBreakdown, PricedComponent, PricedCompositeItem,
};
use crate::models::category::{Category, CategorySummary};
use crate::models::composite_item::CompositeItem;
use crate::models::resource::Resource;
use crate::utils::errors::{not_found_error, AppResult, Entity};
use crate::utils::money::{apply_margin, round2};

/// `custom_margin` si está definido; si no, el margen por defecto de la categoría
pub fn effective_margin(item: &CompositeItem, category: &Category) -> Decimal {
    item.custom_margin.unwrap_or(category.default_margin)
}

/// Valoriza un ítem compuesto.
///
/// Falla con `RESOURCE_NOT_FOUND` si falta cualquier recurso de la
/// composición: no hay precios parciales.
pub fn compute_price(
    item: &CompositeItem,
    category: &Category,
    resources: &HashMap<Uuid, Resource>,
) -> AppResult<PricedCompositeItem> {
    let mut breakdown = CostBreakdown::default();
    let mut composition = Vec::with_capacity(item.composition.len());

    for entry in &item.composition {
        let resource = resources
            .get(&entry.resource_id)
            .ok_or_else(|| not_found_error(Entity::Resource, entry.resource_id))?;

        let subtotal = resource.price * entry.quantity;
        breakdown.add(resource.resource_type, subtotal);
        composition.push(PricedComponent {
            resource: ComponentResource::from(resource),
            quantity: entry.quantity,
            subtotal,
        });
    }

    let margin = effective_margin(item, category);
    let final_price = round2(apply_margin(breakdown.total, margin));

    Ok(PricedCompositeItem {
        id: item.id,
        name: item.name.clone(),
        description: item.description.clone(),
        unit: item.unit.clone(),
        category: CategorySummary::from(category),
        composition,
        cost_breakdown: breakdown,
        custom_margin: item.custom_margin,
        margin,
        final_price,
        active: item.active,
        created_at: item.created_at,
        updated_at: item.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::CreateCategoryRequest;
    use crate::models::composite_item::{CompositionEntry, CreateCompositeItemRequest};
    use crate::models::resource::{CreateResourceRequest, ResourceType};
    use rust_decimal_macros::dec;

    fn category(margin: Decimal) -> Category {
        Category::new(
            CreateCategoryRequest {
                name: "Masonry".to_string(),
                description: None,
                default_margin: margin,
                color: None,
                order: None,
            },
            1,
        )
    }

    fn resource(name: &str, resource_type: ResourceType, price: Decimal) -> Resource {
        Resource::new(CreateResourceRequest {
            name: name.to_string(),
            description: None,
            resource_type,
            unit: "u".to_string(),
            price,
            category_id: None,
        })
    }

    fn item(
        category: &Category,
        composition: Vec<CompositionEntry>,
        custom_margin: Option<Decimal>,
    ) -> CompositeItem {
        CompositeItem::new(CreateCompositeItemRequest {
            name: "Wall m2".to_string(),
            description: None,
            unit: "m2".to_string(),
            category_id: category.id,
            composition,
            custom_margin,
            active: None,
        })
    }

    fn entry(resource_id: Uuid, quantity: Decimal) -> CompositionEntry {
        CompositionEntry {
            resource_id,
            quantity,
        }
    }

    fn index(resources: &[&Resource]) -> HashMap<Uuid, Resource> {
        resources.iter().map(|r| (r.id, (*r).clone())).collect()
    }

    #[test]
    fn test_masonry_wall_scenario() {
        let masonry = category(dec!(25));
        let cement = resource("Cement", ResourceType::Material, dec!(10));
        let wall = item(&masonry, vec![entry(cement.id, dec!(5))], None);

        let priced = compute_price(&wall, &masonry, &index(&[&cement])).unwrap();
        assert_eq!(priced.cost_breakdown.materials, dec!(50));
        assert_eq!(priced.cost_breakdown.total, dec!(50));
        assert_eq!(priced.margin, dec!(25));
        assert_eq!(priced.final_price, dec!(62.50));
        assert_eq!(priced.composition[0].subtotal, dec!(50));
    }

    #[test]
    fn test_custom_margin_overrides_category_default() {
        let masonry = category(dec!(25));
        let cement = resource("Cement", ResourceType::Material, dec!(10));
        let wall = item(&masonry, vec![entry(cement.id, dec!(5))], Some(dec!(10)));

        let priced = compute_price(&wall, &masonry, &index(&[&cement])).unwrap();
        assert_eq!(priced.margin, dec!(10));
        assert_eq!(priced.final_price, dec!(55));

        let repriced = compute_price(&wall, &category(dec!(50)), &index(&[&cement])).unwrap();
        assert_eq!(repriced.final_price, dec!(55));
    }

    #[test]
    fn test_repeated_resource_is_additive_and_bucketed() {
        let masonry = category(dec!(0));
        let cement = resource("Cement", ResourceType::Material, dec!(10));
        let mason = resource("Mason", ResourceType::Labor, dec!(8.5));
        let mixer = resource("Mixer", ResourceType::Equipment, dec!(3));
        let wall = item(
            &masonry,
            vec![
                entry(cement.id, dec!(2)),
                entry(mason.id, dec!(1)),
                entry(cement.id, dec!(1)),
                entry(mixer.id, dec!(0.5)),
            ],
            None,
        );

        let priced = compute_price(&wall, &masonry, &index(&[&cement, &mason, &mixer])).unwrap();
        assert_eq!(priced.cost_breakdown.materials, dec!(30));
        assert_eq!(priced.cost_breakdown.labor, dec!(8.5));
        assert_eq!(priced.cost_breakdown.equipment, dec!(1.5));
        assert_eq!(priced.cost_breakdown.total, dec!(40));
        assert_eq!(priced.final_price, dec!(40));
    }

    #[test]
    fn test_final_price_rounds_half_away_from_zero() {
        let masonry = category(dec!(25));
        let sand = resource("Sand", ResourceType::Material, dec!(49.70));
        let wall = item(&masonry, vec![entry(sand.id, dec!(1))], None);

        // 49.70 * 1.25 = 62.125
        let priced = compute_price(&wall, &masonry, &index(&[&sand])).unwrap();
        assert_eq!(priced.final_price, dec!(62.13));
        assert!(priced.final_price >= priced.cost_breakdown.total);
    }

    #[test]
    fn test_missing_resource_aborts_calculation() {
        let masonry = category(dec!(25));
        let cement = resource("Cement", ResourceType::Material, dec!(10));
        let ghost = Uuid::new_v4();
        let wall = item(
            &masonry,
            vec![entry(cement.id, dec!(1)), entry(ghost, dec!(1))],
            None,
        );

        let err = compute_price(&wall, &masonry, &index(&[&cement])).unwrap_err();
        assert_eq!(err.code(), "RESOURCE_NOT_FOUND");
        assert!(err.to_string().contains(&ghost.to_string()));
    }
}

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::modules::restaurant;

#[derive(Clone)]
pub struct DatabaseConnection {
    pub pool: Pool<Sqlite>,
}

pub async fn connect(database_url: &str) -> DatabaseConnection {
    let options = SqliteConnectOptions::from_str(database_url)
        .unwrap_or_else(|e| {
            tracing::error!("{:}", e);
            panic!("Invalid database url {}", database_url)
        })
        .foreign_keys(true);

    DatabaseConnection {
        pool: SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("{:}", e);
                panic!("Error connecting to database {}", database_url)
            }),
    }
}

pub async fn migrate(db_conn: DatabaseConnection) {
    match sqlx::migrate!().run(&db_conn.pool).await {
        Ok(_) => (),
        Err(err) => {
            tracing::error!("{}", err);
            panic!("Failed to run database migrations");
        }
    }
}

/// Inserts a fixed set of sample restaurants and menu items, but only when the
/// restaurant table is still empty.
pub async fn seed(db_conn: DatabaseConnection) {
    let existing = match restaurant::repository::count(&db_conn.pool).await {
        Ok(count) => count,
        Err(_) => panic!("Failed to count restaurants while seeding"),
    };

    if existing > 0 {
        return;
    }

    let restaurants = vec![
        restaurant::repository::CreateRestaurantPayload {
            name: "Burger Palace".to_string(),
            image: "https://images.unsplash.com/photo-1571091718767-18b5b1457add?w=500"
                .to_string(),
            rating: 4.5,
            review_count: 150,
            delivery_time: "25-35 min".to_string(),
            cuisine: "Fast Food".to_string(),
            distance: "2.1 km".to_string(),
            delivery_fee: 2.99,
            is_open: true,
            featured: true,
            price_range: "$$".to_string(),
        },
        restaurant::repository::CreateRestaurantPayload {
            name: "Pasta Corner".to_string(),
            image: "https://images.unsplash.com/photo-1555396273-367ea4eb4db5?w=500".to_string(),
            rating: 4.7,
            review_count: 203,
            delivery_time: "30-40 min".to_string(),
            cuisine: "Italian".to_string(),
            distance: "1.8 km".to_string(),
            delivery_fee: 1.99,
            is_open: true,
            featured: true,
            price_range: "$$$".to_string(),
        },
        restaurant::repository::CreateRestaurantPayload {
            name: "Asian Fusion".to_string(),
            image: "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?w=500"
                .to_string(),
            rating: 4.6,
            review_count: 89,
            delivery_time: "20-30 min".to_string(),
            cuisine: "Asian".to_string(),
            distance: "3.2 km".to_string(),
            delivery_fee: 3.99,
            is_open: true,
            featured: true,
            price_range: "$$".to_string(),
        },
    ];

    let menus: Vec<Vec<(&str, &str, f64, &str, &str)>> = vec![
        vec![
            (
                "Classic Burger",
                "Juicy beef patty with lettuce, tomato, and special sauce",
                12.99,
                "https://images.unsplash.com/photo-1568901346375-23c9450c58cd?w=300",
                "Main Course",
            ),
            (
                "Cheese Fries",
                "Crispy fries topped with melted cheese",
                6.99,
                "https://images.unsplash.com/photo-1573080496219-bb080dd4f877?w=300",
                "Sides",
            ),
        ],
        vec![
            (
                "Spaghetti Carbonara",
                "Classic Italian pasta with eggs, cheese, and pancetta",
                15.99,
                "https://images.unsplash.com/photo-1621996346565-e3dbc353d2e5?w=300",
                "Main Course",
            ),
            (
                "Margherita Pizza",
                "Fresh tomato sauce, mozzarella, and basil",
                18.99,
                "https://images.unsplash.com/photo-1565299624946-b28f40a0ca4b?w=300",
                "Pizza",
            ),
        ],
        vec![
            (
                "Chicken Teriyaki",
                "Grilled chicken with teriyaki glaze and steamed rice",
                14.99,
                "https://images.unsplash.com/photo-1546833999-b9f581a1996d?w=300",
                "Main Course",
            ),
            (
                "Vegetable Fried Rice",
                "Wok-fried rice with mixed vegetables",
                11.99,
                "https://images.unsplash.com/photo-1603133872878-684f208fb84b?w=300",
                "Rice Dishes",
            ),
        ],
    ];

    for (restaurant_payload, menu) in restaurants.into_iter().zip(menus) {
        let restaurant = match restaurant::repository::create(&db_conn.pool, restaurant_payload)
            .await
        {
            Ok(restaurant) => restaurant,
            Err(_) => panic!("Failed to seed restaurants"),
        };

        for (name, description, price, image, category) in menu {
            if restaurant::repository::create_menu_item(
                &db_conn.pool,
                restaurant::repository::CreateMenuItemPayload {
                    restaurant_id: restaurant.id.clone(),
                    name: name.to_string(),
                    description: description.to_string(),
                    price,
                    image: image.to_string(),
                    category: category.to_string(),
                    is_available: true,
                },
            )
            .await
            .is_err()
            {
                panic!("Failed to seed menu items");
            }
        }
    }

    tracing::debug!("Seeded sample restaurants and menu items");
}

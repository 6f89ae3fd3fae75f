use meal_import::{import_url_with_config, ImportConfig, ImportError, Ingredient, Provenance};

fn create_recipe_html_with_metadata(json_ld: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Recipe Page</title>
            <script type="application/ld+json">
                {json_ld}
            </script>
        </head>
        <body>
            <h1>Recipe</h1>
        </body>
        </html>
        "#
    )
}

fn test_config() -> ImportConfig {
    ImportConfig {
        timeout: 5,
        ..ImportConfig::default()
    }
}

#[tokio::test]
async fn test_json_ld_ingredients_keep_count_and_order() {
    let mut server = mockito::Server::new_async().await;
    let json_ld = r#"
    {
        "@context": "https://schema.org/",
        "@type": "Recipe",
        "name": "Test Recipe",
        "image": "https://example.com/image.jpg",
        "prepTime": "PT15M",
        "cookTime": "PT30M",
        "totalTime": "PT45M",
        "recipeCategory": "Main Course, Dinner",
        "recipeIngredient": [
            "1 cup flour",
            "2 eggs",
            "1/2 cup milk",
            "1 pinch salt"
        ],
        "recipeInstructions": [
            {"@type": "HowToStep", "text": "Whisk the eggs."},
            {"@type": "HowToStep", "text": "Fold in the flour and milk."}
        ]
    }
    "#;

    let _m = server
        .mock("GET", "/recipe")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(create_recipe_html_with_metadata(json_ld))
        .create_async()
        .await;

    let url = format!("{}/recipe", server.url());
    let meal = import_url_with_config(&url, &test_config()).await.unwrap();

    assert_eq!(meal.name, "Test Recipe");
    assert_eq!(meal.photo_reference, "https://example.com/image.jpg");
    assert_eq!(meal.estimated_minutes, 45);
    assert_eq!(
        meal.ingredients,
        vec![
            Ingredient::new("1 cup flour"),
            Ingredient::new("2 eggs"),
            Ingredient::new("1/2 cup milk"),
            Ingredient::new("1 pinch salt"),
        ]
    );
    assert_eq!(
        meal.instructions,
        vec!["Whisk the eggs.", "Fold in the flour and milk."]
    );
    assert_eq!(meal.tags, vec!["Main Course", "Dinner"]);

    match meal.provenance {
        Provenance::Url {
            source_url,
            raw_payload,
        } => {
            assert_eq!(source_url, url);
            assert_eq!(raw_payload["name"], "Test Recipe");
        }
        other => panic!("unexpected provenance {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_block_is_skipped() {
    let mut server = mockito::Server::new_async().await;
    let html = r#"
    <html><head>
        <script type="application/ld+json">{ "@type": "WebSite", broken </script>
        <script type="application/ld+json">
        {"@graph": [
            {"@type": "WebPage", "name": "Not it"},
            {"@type": ["Recipe"], "name": "Graph Curry", "recipeIngredient": ["rice"],
             "recipeInstructions": "1. Cook rice 2. Serve"}
        ]}
        </script>
    </head><body></body></html>
    "#;

    let _m = server
        .mock("GET", "/curry")
        .with_status(200)
        .with_body(html)
        .create_async()
        .await;

    let url = format!("{}/curry", server.url());
    let meal = import_url_with_config(&url, &test_config()).await.unwrap();

    assert_eq!(meal.name, "Graph Curry");
    assert_eq!(meal.ingredients.len(), 1);
    assert_eq!(meal.instructions, vec!["Cook rice", "Serve"]);
}

#[tokio::test]
async fn test_404_is_fetch_error_with_url() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let url = format!("{}/missing", server.url());
    let err = import_url_with_config(&url, &test_config())
        .await
        .unwrap_err();

    match &err {
        ImportError::FetchError { url: failed, .. } => assert_eq!(failed, &url),
        other => panic!("expected FetchError, got {other:?}"),
    }
    assert!(err.to_string().contains(&url));
    assert_eq!(err.status_code().as_u16(), 400);
}

#[tokio::test]
async fn test_page_without_markup_uses_heuristics() {
    let mut server = mockito::Server::new_async().await;
    let html = r#"
    <html>
    <head>
        <title>Weeknight Tacos</title>
        <meta property="og:image" content="/photos/tacos.jpg">
    </head>
    <body>
        <article>
            <ul class="ingredients">
                <li>1 lb ground beef</li>
                <li>8 tortillas</li>
            </ul>
            <ol class="instructions">
                <li>Brown the beef.</li>
                <li>Fill the tortillas.</li>
            </ol>
        </article>
    </body>
    </html>
    "#;

    let _m = server
        .mock("GET", "/tacos")
        .with_status(200)
        .with_body(html)
        .create_async()
        .await;

    let url = format!("{}/tacos", server.url());
    let meal = import_url_with_config(&url, &test_config()).await.unwrap();

    assert_eq!(meal.name, "Weeknight Tacos");
    assert_eq!(
        meal.photo_reference,
        format!("{}/photos/tacos.jpg", server.url())
    );
    assert_eq!(meal.ingredients.len(), 2);
    assert_eq!(
        meal.instructions,
        vec!["Brown the beef.", "Fill the tortillas."]
    );
    assert_eq!(meal.estimated_minutes, 0);
}

#[tokio::test]
async fn test_microdata_page() {
    let mut server = mockito::Server::new_async().await;
    let html = r#"
    <html><body>
    <div itemscope itemtype="https://schema.org/Recipe">
        <h2 itemprop="name">Microdata Muffins</h2>
        <meta itemprop="totalTime" content="PT35M">
        <span itemprop="recipeIngredient">2 cups flour</span>
        <span itemprop="recipeIngredient">1 cup blueberries</span>
        <div itemprop="recipeInstructions">Mix and bake.</div>
    </div>
    </body></html>
    "#;

    let _m = server
        .mock("GET", "/muffins")
        .with_status(200)
        .with_body(html)
        .create_async()
        .await;

    let url = format!("{}/muffins", server.url());
    let meal = import_url_with_config(&url, &test_config()).await.unwrap();

    assert_eq!(meal.name, "Microdata Muffins");
    assert_eq!(meal.estimated_minutes, 35);
    assert_eq!(meal.ingredients.len(), 2);
    assert_eq!(meal.instructions, vec!["Mix and bake."]);
}

#[tokio::test]
async fn test_empty_page_is_sparse_success() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/empty")
        .with_status(200)
        .with_body("<html><body><p>Nothing to see</p></body></html>")
        .create_async()
        .await;

    let url = format!("{}/empty", server.url());
    let meal = import_url_with_config(&url, &test_config()).await.unwrap();

    assert_eq!(meal.name, meal_import::UNTITLED_RECIPE);
    assert!(meal.ingredients.is_empty());
    assert!(meal.instructions.is_empty());
}
